use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{KeyPointDraft, PartialSummary};

/// Outcome of parsing one free-form model reply.
///
/// Parsing is control flow here, not an exception path: callers match on
/// the outcome, and only a `Failure` ever crosses into the error
/// taxonomy (as `Error::GenerationParse`).
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(PartialSummary),
    Failure { reason: String },
}

impl ParseOutcome {
    pub fn into_result(self, chunk_index: usize) -> Result<PartialSummary> {
        match self {
            ParseOutcome::Parsed(partial) => Ok(partial),
            ParseOutcome::Failure { reason } => Err(Error::GenerationParse {
                chunk_index,
                reason,
            }),
        }
    }
}

/// Key points arrive either as plain strings (legacy shape) or as
/// objects with an optional time hint. Both must be accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawKeyPoint {
    Text(String),
    Timed {
        text: String,
        #[serde(default)]
        start_seconds: Option<f64>,
    },
}

#[derive(Debug, Deserialize)]
struct RawPartial {
    summary: Option<String>,
    #[serde(default)]
    key_points: Vec<RawKeyPoint>,
    #[serde(default)]
    topics: Vec<String>,
}

/// Parse a model reply into a [`PartialSummary`] for the given chunk.
///
/// The reply is expected to be a JSON object with `summary`,
/// `key_points` and `topics`, but models routinely wrap it in a
/// Markdown code fence; that wrapping is stripped before parsing.
pub fn parse_partial_summary(raw: &str, chunk_index: usize) -> ParseOutcome {
    let text = strip_code_fence(raw.trim());

    let parsed: RawPartial = match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return ParseOutcome::Failure {
                reason: format!("invalid JSON: {e}"),
            };
        }
    };

    let narrative = match parsed.summary {
        Some(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
        _ => {
            return ParseOutcome::Failure {
                reason: "missing required field: summary".into(),
            };
        }
    };

    let key_points = parsed
        .key_points
        .into_iter()
        .map(|kp| match kp {
            RawKeyPoint::Text(text) => KeyPointDraft {
                text,
                time_hint: None,
            },
            RawKeyPoint::Timed {
                text,
                start_seconds,
            } => KeyPointDraft {
                text,
                time_hint: start_seconds,
            },
        })
        .filter(|kp| !kp.text.trim().is_empty())
        .collect();

    ParseOutcome::Parsed(PartialSummary {
        chunk_index,
        topics: parsed.topics,
        key_points,
        narrative,
    })
}

/// Drop a surrounding Markdown code fence, if present.
fn strip_code_fence(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    text.lines()
        .skip(1)
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::Error;

    #[test]
    fn clean_json_parses() {
        let raw = r#"{
            "summary": "AIの活用事例を紹介した動画。",
            "key_points": [
                {"text": "AIは効率を改善する", "start_seconds": 30},
                {"text": "導入コストに注意", "start_seconds": null}
            ],
            "topics": ["AI", "業務効率化"]
        }"#;
        let partial = parse_partial_summary(raw, 0).into_result(0).unwrap();
        assert_eq!(partial.chunk_index, 0);
        assert_eq!(partial.key_points.len(), 2);
        assert_eq!(partial.key_points[0].time_hint, Some(30.0));
        assert_eq!(partial.key_points[1].time_hint, None);
        assert_eq!(partial.topics, vec!["AI", "業務効率化"]);
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "```json\n{\"summary\": \"要約\", \"key_points\": [], \"topics\": []}\n```";
        let partial = parse_partial_summary(raw, 2).into_result(2).unwrap();
        assert_eq!(partial.narrative, "要約");
    }

    #[test]
    fn legacy_string_key_points_are_accepted() {
        let raw = r#"{"summary": "s", "key_points": ["ポイント1", "ポイント2"]}"#;
        let partial = parse_partial_summary(raw, 0).into_result(0).unwrap();
        assert_eq!(partial.key_points.len(), 2);
        assert!(partial.key_points.iter().all(|kp| kp.time_hint.is_none()));
    }

    #[test]
    fn fractional_time_hints_are_accepted() {
        let raw = r#"{"summary": "s", "key_points": [{"text": "t", "start_seconds": 12.5}]}"#;
        let partial = parse_partial_summary(raw, 0).into_result(0).unwrap();
        assert_eq!(partial.key_points[0].time_hint, Some(12.5));
    }

    #[test]
    fn non_json_reply_is_a_failure() {
        let outcome = parse_partial_summary("I could not summarize this.", 3);
        assert_matches!(outcome, ParseOutcome::Failure { .. });
        assert_matches!(
            outcome.into_result(3),
            Err(Error::GenerationParse { chunk_index: 3, .. })
        );
    }

    #[test]
    fn missing_summary_is_a_failure() {
        let outcome = parse_partial_summary(r#"{"key_points": [], "topics": []}"#, 1);
        assert_matches!(outcome, ParseOutcome::Failure { .. });
    }

    #[test]
    fn empty_key_point_texts_are_dropped() {
        let raw = r#"{"summary": "s", "key_points": ["", "  ", "残すポイント"]}"#;
        let partial = parse_partial_summary(raw, 0).into_result(0).unwrap();
        assert_eq!(partial.key_points.len(), 1);
    }
}
