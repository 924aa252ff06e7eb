use crate::types::{CaptionSegment, Chunk, Transcript};

/// Sentence-boundary characters used when an oversized segment has to be
/// fragmented. Ordered roughly by how natural the break is; Japanese
/// captions dominate the input, so the CJK marks come first.
const SENTENCE_BREAKS: [char; 8] = ['。', '！', '？', '．', '\n', '.', '!', '?'];

/// Partition a transcript into model-sized chunks.
///
/// Consecutive segments are accumulated greedily while the running
/// character total stays within `max_chunk_chars`; a segment that would
/// overflow the budget closes the current chunk and opens the next one.
/// A single segment larger than the whole budget is split at sentence
/// boundaries into fragments whose start offsets are interpolated across
/// the segment's duration by character-length ratio.
///
/// The result is deterministic for a given transcript and budget, and
/// the index-ordered union of chunk segments reproduces the transcript
/// exactly once (with oversized segments replaced by their fragments).
pub fn split_into_chunks(transcript: &Transcript, max_chunk_chars: usize) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current: Vec<CaptionSegment> = Vec::new();
    let mut current_chars = 0usize;

    let mut close = |current: &mut Vec<CaptionSegment>, chunks: &mut Vec<Chunk>| {
        if current.is_empty() {
            return;
        }
        let segments = std::mem::take(current);
        let coverage_start = segments[0].start;
        let coverage_end = segments.last().map(CaptionSegment::end).unwrap_or(0.0);
        chunks.push(Chunk {
            index: chunks.len(),
            segments,
            coverage_start,
            coverage_end,
        });
    };

    for segment in &transcript.segments {
        let pieces = if segment.text.chars().count() > max_chunk_chars {
            split_oversized_segment(segment, max_chunk_chars)
        } else {
            vec![segment.clone()]
        };

        for piece in pieces {
            let piece_chars = piece.text.chars().count();
            if current_chars + piece_chars > max_chunk_chars && !current.is_empty() {
                close(&mut current, &mut chunks);
                current_chars = 0;
            }
            current_chars += piece_chars;
            current.push(piece);
        }
    }
    close(&mut current, &mut chunks);

    chunks
}

/// Split one oversized segment into budget-sized fragments.
///
/// Fragment start offsets are linearly interpolated across the segment's
/// duration by character position, so the fragments partition the
/// segment's time range exactly.
fn split_oversized_segment(segment: &CaptionSegment, max_chunk_chars: usize) -> Vec<CaptionSegment> {
    let texts = split_text(&segment.text, max_chunk_chars);
    let total_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
    if total_chars == 0 {
        return vec![segment.clone()];
    }

    let mut fragments = Vec::with_capacity(texts.len());
    let mut prefix = 0usize;
    for text in texts {
        let len = text.chars().count();
        let start = segment.start + segment.duration * (prefix as f64 / total_chars as f64);
        let end =
            segment.start + segment.duration * ((prefix + len) as f64 / total_chars as f64);
        prefix += len;
        fragments.push(CaptionSegment {
            text,
            start,
            duration: end - start,
        });
    }
    fragments
}

/// Cut text into pieces of at most `budget` characters, preferring
/// sentence boundaries. A single sentence longer than the budget is cut
/// hard at the budget (on a char boundary).
fn split_text(text: &str, budget: usize) -> Vec<String> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for sentence in sentences(text) {
        let sentence_chars = sentence.chars().count();
        if current_chars + sentence_chars > budget && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if sentence_chars > budget {
            // No boundary to use; cut at the budget.
            let chars: Vec<char> = sentence.chars().collect();
            for slab in chars.chunks(budget) {
                pieces.push(slab.iter().collect());
            }
            continue;
        }
        current.push_str(&sentence);
        current_chars += sentence_chars;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Split into sentences, keeping the delimiter with the sentence it
/// terminates. Concatenating the result reproduces the input.
fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if SENTENCE_BREAKS.contains(&ch) {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, start: f64, duration: f64) -> CaptionSegment {
        CaptionSegment {
            text: text.to_string(),
            start,
            duration,
        }
    }

    fn transcript(segments: Vec<CaptionSegment>) -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".into(),
            language: "ja".into(),
            segments,
        }
    }

    #[test]
    fn small_transcript_fits_one_chunk() {
        let t = transcript(vec![
            seg("こんにちは。", 0.0, 2.0),
            seg("今日はAIの話です。", 2.0, 3.0),
            seg("よろしくお願いします。", 5.0, 2.5),
        ]);
        let chunks = split_into_chunks(&t, 8000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].segments.len(), 3);
        assert_eq!(chunks[0].coverage_start, 0.0);
        assert_eq!(chunks[0].coverage_end, 7.5);
    }

    #[test]
    fn overflow_closes_the_chunk_before_the_segment() {
        let t = transcript(vec![
            seg("aaaa", 0.0, 1.0),
            seg("bbbb", 1.0, 1.0),
            seg("cccc", 2.0, 1.0),
        ]);
        // Budget of 8 holds two 4-char segments, not three.
        let chunks = split_into_chunks(&t, 8);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].segments.len(), 2);
        assert_eq!(chunks[1].segments.len(), 1);
        assert_eq!(chunks[1].segments[0].text, "cccc");
    }

    #[test]
    fn union_of_chunks_reproduces_the_transcript() {
        let segments: Vec<_> = (0..50)
            .map(|i| seg("セグメントの本文です。", i as f64 * 3.0, 3.0))
            .collect();
        let t = transcript(segments.clone());
        let chunks = split_into_chunks(&t, 60);

        let flattened: Vec<_> = chunks.iter().flat_map(|c| c.segments.iter()).collect();
        assert_eq!(flattened.len(), segments.len());
        for (got, want) in flattened.iter().zip(&segments) {
            assert_eq!(got.text, want.text);
            assert_eq!(got.start, want.start);
        }
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let segments: Vec<_> = (0..30)
            .map(|i| seg("同じ入力なら同じ境界。", i as f64, 1.0))
            .collect();
        let t = transcript(segments);
        let a = split_into_chunks(&t, 50);
        let b = split_into_chunks(&t, 50);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.coverage_start, y.coverage_start);
            assert_eq!(x.coverage_end, y.coverage_end);
            assert_eq!(x.segments.len(), y.segments.len());
        }
    }

    #[test]
    fn oversized_segment_fragments_partition_its_time_range() {
        // One 40s segment with four 10-char sentences and a budget of 10.
        let text = "一二三四五六七八九。一二三四五六七八九。一二三四五六七八九。一二三四五六七八九。";
        let t = transcript(vec![seg(text, 100.0, 40.0)]);
        let chunks = split_into_chunks(&t, 10);

        let fragments: Vec<_> = chunks.iter().flat_map(|c| c.segments.clone()).collect();
        assert_eq!(fragments.len(), 4);

        // Text partition: concatenation reproduces the original.
        let joined: String = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(joined, text);

        // Time partition: contiguous, starts interpolated by char ratio.
        assert_eq!(fragments[0].start, 100.0);
        assert!((fragments[1].start - 110.0).abs() < 1e-9);
        assert!((fragments[2].start - 120.0).abs() < 1e-9);
        let last = fragments.last().unwrap();
        assert!((last.end() - 140.0).abs() < 1e-9);
        for pair in fragments.windows(2) {
            assert!((pair[0].end() - pair[1].start).abs() < 1e-9);
        }
    }

    #[test]
    fn unbreakable_oversized_text_is_cut_at_the_budget() {
        let text = "あ".repeat(25);
        let t = transcript(vec![seg(&text, 0.0, 5.0)]);
        let chunks = split_into_chunks(&t, 10);
        let fragments: Vec<_> = chunks.iter().flat_map(|c| c.segments.clone()).collect();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].text.chars().count(), 10);
        assert_eq!(fragments[2].text.chars().count(), 5);
    }

    #[test]
    fn empty_transcript_yields_no_chunks() {
        let t = transcript(vec![]);
        assert!(split_into_chunks(&t, 8000).is_empty());
    }
}
