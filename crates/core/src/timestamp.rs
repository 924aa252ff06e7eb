use crate::types::Chunk;

/// Bind a model-produced time hint to a real caption timestamp.
///
/// Lookup order:
/// 1. the segment whose `[start, start + duration)` interval contains
///    the hint;
/// 2. otherwise, the segment whose start is closest to the hint after
///    clamping it into the chunk's coverage window.
///
/// Total function: an absent or non-finite hint, or a chunk with no
/// segments, resolves to "no timestamp" rather than an error.
pub fn resolve_time_hint(hint: Option<f64>, chunk: &Chunk) -> Option<f64> {
    let hint = hint.filter(|h| h.is_finite())?;
    if chunk.segments.is_empty() {
        return None;
    }

    for segment in &chunk.segments {
        if hint >= segment.start && hint < segment.end() {
            return Some(segment.start);
        }
    }

    let clamped = hint.clamp(chunk.coverage_start, chunk.coverage_end);
    chunk
        .segments
        .iter()
        .min_by(|a, b| {
            let da = (a.start - clamped).abs();
            let db = (b.start - clamped).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|segment| segment.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaptionSegment;

    fn chunk(segments: Vec<(f64, f64)>) -> Chunk {
        let segments: Vec<_> = segments
            .into_iter()
            .map(|(start, duration)| CaptionSegment {
                text: "字幕".into(),
                start,
                duration,
            })
            .collect();
        let coverage_start = segments.first().map(|s| s.start).unwrap_or(0.0);
        let coverage_end = segments.last().map(|s| s.end()).unwrap_or(0.0);
        Chunk {
            index: 0,
            segments,
            coverage_start,
            coverage_end,
        }
    }

    #[test]
    fn hint_inside_a_segment_snaps_to_its_start() {
        let c = chunk(vec![(0.0, 5.0), (5.0, 5.0), (10.0, 5.0)]);
        assert_eq!(resolve_time_hint(Some(6.2), &c), Some(5.0));
    }

    #[test]
    fn hint_in_a_gap_picks_the_closest_start() {
        // Gap between 5.0 and 20.0.
        let c = chunk(vec![(0.0, 5.0), (20.0, 5.0)]);
        assert_eq!(resolve_time_hint(Some(6.0), &c), Some(0.0));
        assert_eq!(resolve_time_hint(Some(18.0), &c), Some(20.0));
    }

    #[test]
    fn hint_outside_the_window_is_clamped() {
        let c = chunk(vec![(100.0, 5.0), (105.0, 5.0)]);
        assert_eq!(resolve_time_hint(Some(3.0), &c), Some(100.0));
        assert_eq!(resolve_time_hint(Some(9999.0), &c), Some(105.0));
    }

    #[test]
    fn absent_or_bad_hints_resolve_to_nothing() {
        let c = chunk(vec![(0.0, 5.0)]);
        assert_eq!(resolve_time_hint(None, &c), None);
        assert_eq!(resolve_time_hint(Some(f64::NAN), &c), None);
        assert_eq!(resolve_time_hint(Some(f64::INFINITY), &c), None);
    }

    #[test]
    fn empty_chunk_resolves_to_nothing() {
        let c = Chunk {
            index: 0,
            segments: vec![],
            coverage_start: 0.0,
            coverage_end: 0.0,
        };
        assert_eq!(resolve_time_hint(Some(1.0), &c), None);
    }

    #[test]
    fn in_window_hints_resolve_inside_the_window() {
        let c = chunk(vec![(10.0, 4.0), (14.0, 4.0), (18.0, 4.0)]);
        for i in 0..=120 {
            let hint = 10.0 + (i as f64) * 0.1;
            let resolved = resolve_time_hint(Some(hint), &c).unwrap();
            assert!(resolved >= c.coverage_start && resolved <= c.coverage_end);
        }
    }
}
