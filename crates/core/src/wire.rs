//! Request/response shapes of the summarize endpoint, shared by the
//! server and by HTTP consumers (the CLI's remote mode).
//!
//! Backward compatibility contract: key points are served as
//! `{ "text": ..., "start_seconds": ... }` objects, but older servers
//! emitted plain strings, so consumers accept both. Error payloads carry
//! a `detail` field that may be a string, an object, or a
//! validation-style array; [`error_detail_message`] extracts a
//! human-readable message from any of the three.

use serde::{Deserialize, Serialize};

use crate::types::VideoSummary;

fn default_language() -> String {
    "ja".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// One key point on the wire. `Timed` is the shape we serve; `Legacy`
/// exists so consumers keep working against plain-string responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPointPayload {
    Timed {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_seconds: Option<u64>,
    },
    Legacy(String),
}

impl KeyPointPayload {
    pub fn text(&self) -> &str {
        match self {
            KeyPointPayload::Timed { text, .. } => text,
            KeyPointPayload::Legacy(text) => text,
        }
    }

    pub fn start_seconds(&self) -> Option<u64> {
        match self {
            KeyPointPayload::Timed { start_seconds, .. } => *start_seconds,
            KeyPointPayload::Legacy(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<KeyPointPayload>,
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

impl From<VideoSummary> for SummarizeResponse {
    fn from(summary: VideoSummary) -> Self {
        Self {
            video_id: summary.video_id,
            title: summary.title,
            summary: summary.detailed_summary,
            key_points: summary
                .key_points
                .into_iter()
                .map(|kp| KeyPointPayload::Timed {
                    text: kp.text,
                    start_seconds: kp.start_seconds.map(|s| s.round() as u64),
                })
                .collect(),
            topics: summary.topics,
            duration_seconds: summary.duration_seconds,
        }
    }
}

/// Extract a human-readable message from an error response body's
/// `detail` value. Handles all three shapes servers are known to emit:
/// a plain string, an object carrying `detail`/`message`, and a
/// validation-error array of objects carrying `msg`/`message`.
pub fn error_detail_message(detail: &serde_json::Value) -> String {
    const FALLBACK: &str = "エラーが発生しました";

    match detail {
        serde_json::Value::String(s) if !s.is_empty() => s.clone(),
        serde_json::Value::Object(map) => map
            .get("detail")
            .or_else(|| map.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK.to_string()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| {
                item.get("msg")
                    .or_else(|| item.get("message"))
                    .and_then(|v| v.as_str())
            })
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK.to_string()),
        _ => FALLBACK.to_string(),
    }
}
