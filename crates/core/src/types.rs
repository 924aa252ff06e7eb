use serde::{Deserialize, Serialize};

/// One timestamped line of a video's spoken-text track.
///
/// Segments are immutable once fetched and are never split across chunk
/// boundaries, except when a single oversized segment is fragmented by
/// the chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    /// Start offset in seconds from the beginning of the video.
    pub start: f64,
    /// Display duration in seconds.
    pub duration: f64,
}

impl CaptionSegment {
    /// End of this segment's display interval.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// The full ordered caption track for one video.
///
/// Segments are sorted ascending by `start`. Overlapping display
/// intervals are tolerated; out-of-order segments are not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<CaptionSegment>,
}

impl Transcript {
    /// Total character count across all segments.
    pub fn char_count(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }

    /// End timestamp of the last segment, if any.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end())
    }
}

/// A budget-bounded contiguous slice of a transcript, sent to the
/// generation service in one call.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: usize,
    pub segments: Vec<CaptionSegment>,
    pub coverage_start: f64,
    pub coverage_end: f64,
}

impl Chunk {
    /// The chunk text as seen by the generation service: one line per
    /// segment, prefixed with its start offset in whole seconds.
    pub fn timestamped_text(&self) -> String {
        self.segments
            .iter()
            .map(|seg| format!("[{}] {}", seg.start as u64, seg.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A key point as produced by the generation service, before its time
/// hint has been bound to the caption timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPointDraft {
    pub text: String,
    /// Model-produced, possibly inaccurate, time reference within the
    /// owning chunk's coverage window.
    pub time_hint: Option<f64>,
}

/// Structured output of one generation call, one per chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialSummary {
    pub chunk_index: usize,
    pub topics: Vec<String>,
    pub key_points: Vec<KeyPointDraft>,
    pub narrative: String,
}

/// A key point whose time hint has been resolved against real caption
/// segments. `start_seconds` is absent when the hint could not be bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedKeyPoint {
    pub text: String,
    pub start_seconds: Option<f64>,
}

/// The final digest for one video.
///
/// `key_points` is sorted ascending by `start_seconds`; entries without a
/// resolved timestamp come after all timestamped entries, in generation
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    /// Display title: the video's own title when known, otherwise the
    /// generated one.
    pub title: String,
    /// Title generated from the summary content.
    pub summary_title: String,
    pub key_points: Vec<ResolvedKeyPoint>,
    pub detailed_summary: String,
    pub topics: Vec<String>,
    pub duration_seconds: Option<u64>,
}
