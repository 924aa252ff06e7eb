use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use vidigest_core::wire::{SummarizeRequest, SummarizeResponse};
use vidigest_core::Pipeline;

use crate::error::ApiError;

pub type AppState = Arc<Pipeline>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/summarize", post(summarize))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Summarize the video behind the requested URL.
///
/// Runs one full pipeline invocation; the request's language (default
/// "ja") selects both the caption track and the digest language.
async fn summarize(
    State(pipeline): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    tracing::info!(url = %request.url, language = %request.language, "summarize request");
    let summary = pipeline.run(&request.url, &request.language).await?;
    Ok(Json(SummarizeResponse::from(summary)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use vidigest_core::{
        CaptionSegment, Chunk, Error, KeyPointDraft, PartialSummary, PipelineConfig,
        SummaryGenerator, Transcript, TranscriptSource,
    };

    use super::*;

    struct FixedSource(Option<Transcript>);

    #[async_trait]
    impl TranscriptSource for FixedSource {
        async fn fetch_transcript(
            &self,
            video_id: &str,
            language: &str,
        ) -> Result<Transcript, Error> {
            match &self.0 {
                Some(t) => Ok(t.clone()),
                None => Err(Error::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                    language: language.to_string(),
                }),
            }
        }
    }

    struct FixedGenerator;

    #[async_trait]
    impl SummaryGenerator for FixedGenerator {
        async fn summarize(
            &self,
            chunk: &Chunk,
            _total_parts: usize,
            _language: &str,
            _video_title: Option<&str>,
        ) -> Result<PartialSummary, Error> {
            Ok(PartialSummary {
                chunk_index: chunk.index,
                topics: vec!["AI".into()],
                key_points: vec![KeyPointDraft {
                    text: "重要なポイント".into(),
                    time_hint: Some(chunk.coverage_start),
                }],
                narrative: "要約本文。".into(),
            })
        }
    }

    fn test_app(transcript: Option<Transcript>) -> Router {
        let config = PipelineConfig {
            call_timeout: Duration::from_secs(1),
            overall_timeout: Duration::from_secs(1),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(
            Arc::new(FixedSource(transcript)),
            Arc::new(FixedGenerator),
            config,
        );
        router(Arc::new(pipeline))
    }

    fn sample_transcript() -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".into(),
            language: "ja".into(),
            segments: vec![CaptionSegment {
                text: "こんにちは".into(),
                start: 0.0,
                duration: 2.5,
            }],
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = test_app(Some(sample_transcript()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn summarize_returns_the_digest() {
        let app = test_app(Some(sample_transcript()));
        let request = Request::post("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["video_id"], "dQw4w9WgXcQ");
        assert_eq!(body["key_points"][0]["text"], "重要なポイント");
        assert_eq!(body["key_points"][0]["start_seconds"], 0);
        assert_eq!(body["topics"][0], "AI");
    }

    #[tokio::test]
    async fn invalid_url_maps_to_400_with_detail() {
        let app = test_app(Some(sample_transcript()));
        let request = Request::post("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"url": "https://example.com/video"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn missing_captions_map_to_404() {
        let app = test_app(None);
        let request = Request::post("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "language": "en"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("字幕"));
    }
}
