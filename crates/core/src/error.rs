use std::time::Duration;

use thiserror::Error;

/// Pipeline stage, used for tagging failures and tracing spans.
///
/// A run moves `ResolvingId → FetchingTranscript → Chunking → Summarizing
/// → Merging`; a failure in any stage carries the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingId,
    FetchingTranscript,
    Chunking,
    Summarizing,
    Merging,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ResolvingId => "resolving_id",
            Stage::FetchingTranscript => "fetching_transcript",
            Stage::Chunking => "chunking",
            Stage::Summarizing => "summarizing",
            Stage::Merging => "merging",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not extract a video id from URL: {url}")]
    InvalidUrl { url: String },

    #[error("No captions available for video {video_id} (language: {language})")]
    TranscriptUnavailable { video_id: String, language: String },

    #[error("Generation call for chunk {chunk_index} timed out")]
    GenerationTimeout { chunk_index: usize },

    #[error("Generation service rate-limited chunk {chunk_index}")]
    RateLimited { chunk_index: usize },

    #[error("Could not parse generation output for chunk {chunk_index}: {reason}")]
    GenerationParse { chunk_index: usize, reason: String },

    #[error("Summarization failed for chunk {chunk_index}: {source}")]
    Summarization {
        chunk_index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Pipeline exceeded overall deadline of {limit:?}")]
    DeadlineExceeded { limit: Duration },

    #[error("Pipeline invocation was cancelled")]
    Cancelled,

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Caption fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The stage this error belongs to. Used by frontends for reporting.
    pub fn stage(&self) -> Stage {
        match self {
            Error::InvalidUrl { .. } => Stage::ResolvingId,
            Error::TranscriptUnavailable { .. } | Error::Http(_) => Stage::FetchingTranscript,
            Error::GenerationTimeout { .. }
            | Error::RateLimited { .. }
            | Error::GenerationParse { .. }
            | Error::Summarization { .. }
            | Error::DeadlineExceeded { .. }
            | Error::Cancelled
            | Error::MissingApiKey { .. } => Stage::Summarizing,
            Error::Json(_) => Stage::Merging,
        }
    }

    /// Whether the orchestrator may retry the chunk call that produced
    /// this error. Only rate limiting and transport timeouts qualify; a
    /// malformed model response is a stable defect for that chunk.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited { .. } | Error::GenerationTimeout { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
