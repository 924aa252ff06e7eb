//! Vidigest Core Library
//!
//! Core functionality for turning a captioned video's transcript into a
//! structured digest: a title, timestamped key points, topics, and a
//! narrative summary. The pipeline fetches the caption track, splits it
//! into model-sized chunks, summarizes each chunk through an AI provider,
//! resolves key-point time hints back onto the caption timeline, and
//! merges everything into one chronological summary.

pub mod chunker;
pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod merge;
pub mod parse;
pub mod pipeline;
pub mod provider;
pub mod timestamp;
pub mod transcript;
pub mod types;
pub mod video_id;
pub mod wire;

// Re-export commonly used items at crate root
pub use chunker::split_into_chunks;
pub use config::{PipelineConfig, RetryPolicy};
pub use error::{Error, Result, Stage};
pub use format::{format_summary_readable, format_timestamp};
pub use generator::{GroqGenerator, SummaryGenerator};
pub use merge::merge_partials;
pub use pipeline::Pipeline;
pub use provider::{Provider, ProviderConfig};
pub use timestamp::resolve_time_hint;
pub use transcript::{TranscriptSource, YoutubeCaptionSource};
pub use types::{
    CaptionSegment, Chunk, KeyPointDraft, PartialSummary, ResolvedKeyPoint, Transcript,
    VideoSummary,
};
pub use video_id::extract_video_id;
