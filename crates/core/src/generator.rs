use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::parse::parse_partial_summary;
use crate::provider::Provider;
use crate::types::{Chunk, PartialSummary};

/// Sampling temperature. Kept low for consistent, concrete summaries.
const TEMPERATURE: f64 = 0.3;
/// Output-token ceiling per generation call.
const MAX_OUTPUT_TOKENS: u32 = 4096;

static CHUNK_PROMPT: &str = r#"You are an expert at summarizing the caption track of a video.
Video title (for reference): {video_title}

Below is part {part}/{total_parts} of the caption track, covering seconds {coverage_start} to {coverage_end}. Each line is "[seconds] caption text".

<transcript_chunk>
{chunk}
</transcript_chunk>

Summarize this part. You MUST output ONLY valid JSON matching this exact structure (no markdown, no explanation):
{
  "summary": "1-2 paragraph narrative summary of this part",
  "key_points": [
    { "text": "key point 1", "start_seconds": <integer> },
    { "text": "key point 2", "start_seconds": null }
  ],
  "topics": ["topic1", "topic2"]
}

Rules:
- Write ALL text content in {language} language
- Extract 3-5 key points; each is one concise, concrete sentence grounded in the captions, no speculation
- start_seconds is the [seconds] value where the point is spoken, between {coverage_start} and {coverage_end}; use null when unsure
- topics are 2-5 concrete words naming what this part covers; avoid vague terms
- Keep technical terms as-is
- Output ONLY the JSON, nothing else"#;

/// The generation service as a polymorphic capability.
///
/// Production uses the network-backed [`GroqGenerator`]; tests use
/// deterministic stubs. Implementations never retry; retry policy lives
/// in the orchestrator.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Summarize one chunk into a [`PartialSummary`].
    ///
    /// `part`/`total_parts` give the model its position in the overall
    /// track; `video_title` is a non-authoritative hint.
    async fn summarize(
        &self,
        chunk: &Chunk,
        total_parts: usize,
        language: &str,
        video_title: Option<&str>,
    ) -> Result<PartialSummary>;
}

/// Network-backed generator against an OpenAI-compatible
/// chat-completions endpoint.
pub struct GroqGenerator {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
}

impl GroqGenerator {
    /// Build a generator for the given provider, validating its API key
    /// up front. `call_timeout` bounds each individual request.
    pub fn new(provider: Provider, call_timeout: Duration) -> Result<Self> {
        let api_key = provider.validate_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()?;
        Ok(Self {
            client,
            provider,
            api_key,
        })
    }

    fn build_prompt(
        &self,
        chunk: &Chunk,
        total_parts: usize,
        language: &str,
        video_title: Option<&str>,
    ) -> String {
        CHUNK_PROMPT
            .replace("{video_title}", video_title.unwrap_or("(unknown)"))
            .replace("{part}", &(chunk.index + 1).to_string())
            .replace("{total_parts}", &total_parts.to_string())
            .replace("{coverage_start}", &(chunk.coverage_start as u64).to_string())
            .replace("{coverage_end}", &(chunk.coverage_end.ceil() as u64).to_string())
            .replace("{language}", language)
            .replace("{chunk}", &chunk.timestamped_text())
    }
}

#[async_trait]
impl SummaryGenerator for GroqGenerator {
    async fn summarize(
        &self,
        chunk: &Chunk,
        total_parts: usize,
        language: &str,
        video_title: Option<&str>,
    ) -> Result<PartialSummary> {
        let config = self.provider.config();
        let prompt = self.build_prompt(chunk, total_parts, language, video_title);

        tracing::debug!(
            chunk_index = chunk.index,
            model = config.model,
            chars = prompt.chars().count(),
            "sending generation request"
        );

        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": TEMPERATURE,
                "max_completion_tokens": MAX_OUTPUT_TOKENS,
            }))
            .send()
            .await
            .map_err(|e| classify_transport_error(e, chunk.index))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                chunk_index: chunk.index,
            });
        }
        let response = response.error_for_status()?;

        let body = response.json::<serde_json::Value>().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::GenerationParse {
                chunk_index: chunk.index,
                reason: "response carried no message content".into(),
            })?;

        parse_partial_summary(content, chunk.index).into_result(chunk.index)
    }
}

fn classify_transport_error(err: reqwest::Error, chunk_index: usize) -> Error {
    if err.is_timeout() {
        Error::GenerationTimeout { chunk_index }
    } else {
        Error::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaptionSegment;

    #[test]
    fn prompt_carries_window_position_and_language() {
        // The builder itself needs no key; construct the generator parts
        // by hand to keep this test network-free.
        let generator = GroqGenerator {
            client: reqwest::Client::new(),
            provider: Provider::Groq,
            api_key: "test-key".into(),
        };
        let chunk = Chunk {
            index: 1,
            segments: vec![CaptionSegment {
                text: "本文".into(),
                start: 120.0,
                duration: 4.5,
            }],
            coverage_start: 120.0,
            coverage_end: 124.5,
        };
        let prompt = generator.build_prompt(&chunk, 3, "ja", Some("動画タイトル"));
        assert!(prompt.contains("part 2/3"));
        assert!(prompt.contains("seconds 120 to 125"));
        assert!(prompt.contains("[120] 本文"));
        assert!(prompt.contains("in ja language"));
        assert!(prompt.contains("動画タイトル"));
    }
}
