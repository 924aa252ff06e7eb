use crate::timestamp::resolve_time_hint;
use crate::types::{Chunk, PartialSummary, ResolvedKeyPoint, VideoSummary};

/// Topics kept in the merged summary; overflow is dropped from the tail.
const MAX_TOPICS: usize = 10;

/// Two distinct key points this similar, spoken this close together, are
/// treated as the same point.
const SIMILARITY_THRESHOLD: f64 = 0.85;
const DEDUP_WINDOW_SECONDS: f64 = 120.0;

/// Combine ordered chunk results into one deduplicated, chronologically
/// ordered, title-bearing summary.
///
/// `partials` must be ordered by chunk index (the orchestrator's slot
/// buffer guarantees this); each key point's time hint is resolved
/// against its owning chunk's caption segments before merging. The
/// supplied `video_title` and `duration_seconds` come from video
/// metadata, never from the model.
pub fn merge_partials(
    partials: &[PartialSummary],
    chunks: &[Chunk],
    video_id: &str,
    video_title: Option<&str>,
    duration_seconds: Option<u64>,
) -> VideoSummary {
    // Key points: chunk order is chronological by construction, so the
    // concatenation is the base ordering; a stable sort then moves
    // resolved timestamps into ascending order while unresolved entries
    // keep their relative position at the end.
    let mut key_points: Vec<ResolvedKeyPoint> = Vec::new();
    for partial in partials {
        for draft in &partial.key_points {
            let start_seconds = chunks
                .get(partial.chunk_index)
                .and_then(|chunk| resolve_time_hint(draft.time_hint, chunk));
            key_points.push(ResolvedKeyPoint {
                text: draft.text.trim().to_string(),
                start_seconds,
            });
        }
    }
    key_points.sort_by(|a, b| match (a.start_seconds, b.start_seconds) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    let key_points = dedup_key_points(key_points);

    // Topics: first-seen union across chunks, capped.
    let mut topics: Vec<String> = Vec::new();
    for partial in partials {
        for topic in &partial.topics {
            let topic = topic.trim();
            if topic.is_empty() || topics.iter().any(|t| t == topic) {
                continue;
            }
            topics.push(topic.to_string());
        }
    }
    topics.truncate(MAX_TOPICS);

    // Narrative: paragraph-joined fragments in chunk order. Favors
    // determinism and latency over a second finalization model call.
    let detailed_summary = partials
        .iter()
        .map(|p| p.narrative.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let summary_title = generated_title(&topics, &detailed_summary);
    let title = match video_title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => summary_title.clone(),
    };

    VideoSummary {
        video_id: video_id.to_string(),
        title,
        summary_title,
        key_points,
        detailed_summary,
        topics,
        duration_seconds,
    }
}

/// Collapse duplicate key points, keeping the first occurrence.
///
/// A point is a duplicate when its normalized text matches a kept point
/// exactly, or when it is close enough in both wording and timestamp.
/// Applying this to an already-deduplicated list is a no-op, which makes
/// the merge idempotent.
pub fn dedup_key_points(points: Vec<ResolvedKeyPoint>) -> Vec<ResolvedKeyPoint> {
    let mut kept: Vec<ResolvedKeyPoint> = Vec::new();
    let mut kept_norms: Vec<String> = Vec::new();

    for point in points {
        let norm = normalize(&point.text);
        if norm.is_empty() {
            continue;
        }
        let duplicate = kept.iter().zip(&kept_norms).any(|(existing, existing_norm)| {
            if *existing_norm == norm {
                return true;
            }
            within_window(existing.start_seconds, point.start_seconds)
                && bigram_similarity(existing_norm, &norm) >= SIMILARITY_THRESHOLD
        });
        if !duplicate {
            kept_norms.push(norm);
            kept.push(point);
        }
    }
    kept
}

fn within_window(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= DEDUP_WINDOW_SECONDS,
        (None, None) => true,
        _ => false,
    }
}

/// Case-fold, collapse whitespace, and trim trailing punctuation.
fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .to_lowercase()
        .trim_end_matches(['。', '．', '.', '!', '！', '?', '？', '、', ','])
        .to_string()
}

/// Jaccard similarity over character bigrams.
fn bigram_similarity(a: &str, b: &str) -> f64 {
    let bigrams = |s: &str| -> Vec<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };
    let (ba, bb) = (bigrams(a), bigrams(b));
    if ba.is_empty() || bb.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }
    let mut remaining = bb.clone();
    let mut intersection = 0usize;
    for bigram in &ba {
        if let Some(pos) = remaining.iter().position(|r| r == bigram) {
            remaining.swap_remove(pos);
            intersection += 1;
        }
    }
    let union = ba.len() + bb.len() - intersection;
    intersection as f64 / union as f64
}

/// Fallback title when the video's own title is unavailable: the first
/// chunk's leading topic, else the first narrative sentence, else a
/// fixed placeholder. Never empty.
fn generated_title(topics: &[String], narrative: &str) -> String {
    if let Some(topic) = topics.first() {
        return topic.clone();
    }
    let first_sentence = narrative
        .split_inclusive(['。', '．', '.', '!', '！', '?', '？', '\n'])
        .map(str::trim)
        .find(|s| !s.is_empty());
    match first_sentence {
        Some(sentence) => sentence.to_string(),
        None => "タイトル不明".to_string(),
    }
}
