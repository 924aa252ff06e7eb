use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vidigest_core::Error;

/// HTTP wrapper around the pipeline's error taxonomy.
///
/// Implements [`IntoResponse`] so handlers can use `?`; every error
/// becomes a `{ "detail": ... }` payload with a short, user-facing
/// message. Internal causes are logged, never served.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::InvalidUrl { .. } => (
                StatusCode::BAD_REQUEST,
                "有効な動画URLを指定してください".to_string(),
            ),
            Error::TranscriptUnavailable { language, .. } => (
                StatusCode::NOT_FOUND,
                format!("この動画には利用可能な字幕がありません（言語: {language}）"),
            ),
            Error::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "生成サービスが混み合っています。しばらくしてから再試行してください".to_string(),
            ),
            Error::GenerationTimeout { .. } | Error::DeadlineExceeded { .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                "要約の生成がタイムアウトしました".to_string(),
            ),
            Error::GenerationParse { .. } | Error::Summarization { .. } => {
                tracing::error!(stage = %self.0.stage(), error = %self.0, "summarization failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "要約の生成に失敗しました".to_string(),
                )
            }
            Error::Cancelled => (
                StatusCode::REQUEST_TIMEOUT,
                "リクエストが中断されました".to_string(),
            ),
            Error::MissingApiKey { .. } | Error::Http(_) | Error::Json(_) => {
                tracing::error!(stage = %self.0.stage(), error = %self.0, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "サーバーエラーが発生しました".to_string(),
                )
            }
        };

        let body = json!({ "detail": message });
        (status, axum::Json(body)).into_response()
    }
}
