use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{CaptionSegment, Transcript};

const TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";
const OEMBED_URL: &str = "https://www.youtube.com/oembed";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Supplier of a video's ordered caption track.
///
/// The pipeline only ever talks to this boundary; the network
/// implementation below is swapped for stubs in tests.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<Transcript>;

    /// The video's own title, when cheaply available. Failures are
    /// swallowed; the pipeline proceeds without a title.
    async fn fetch_title(&self, _video_id: &str) -> Option<String> {
        None
    }
}

/// Caption fetch against YouTube's timedtext endpoint (json3 format),
/// with the video title looked up via oEmbed.
pub struct YoutubeCaptionSource {
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TimedTextBody {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    t_start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

impl YoutubeCaptionSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptionSource {
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<Transcript> {
        let response = self
            .client
            .get(TIMEDTEXT_URL)
            .query(&[("v", video_id), ("lang", language), ("fmt", "json3")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::info!(video_id, language, status = %response.status(), "caption track not served");
            return Err(Error::TranscriptUnavailable {
                video_id: video_id.to_string(),
                language: language.to_string(),
            });
        }

        // An empty body means the video has no track in this language;
        // the endpoint answers 200 either way.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(Error::TranscriptUnavailable {
                video_id: video_id.to_string(),
                language: language.to_string(),
            });
        }
        let parsed: TimedTextBody = serde_json::from_str(&body)?;

        let mut segments: Vec<CaptionSegment> = parsed
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
                let text = text.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                Some(CaptionSegment {
                    text,
                    start: event.t_start_ms as f64 / 1000.0,
                    duration: event.d_duration_ms as f64 / 1000.0,
                })
            })
            .collect();

        if segments.is_empty() {
            return Err(Error::TranscriptUnavailable {
                video_id: video_id.to_string(),
                language: language.to_string(),
            });
        }

        // Transcript invariant: segments ascend by start time. Overlaps
        // are tolerated, out-of-order events are not.
        segments.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

        tracing::info!(video_id, language, segments = segments.len(), "caption track fetched");

        Ok(Transcript {
            video_id: video_id.to_string(),
            language: language.to_string(),
            segments,
        })
    }

    async fn fetch_title(&self, video_id: &str) -> Option<String> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        let result = self
            .client
            .get(OEMBED_URL)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(video_id, error = %e, "skipping video title lookup");
                return None;
            }
        };

        let body = response.json::<serde_json::Value>().await.ok()?;
        let title = body["title"].as_str()?.trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    }
}
