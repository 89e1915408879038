//! Maps a playback timestamp to the active timeline interval

use crate::Timeline;

/// Returns the index of the interval whose mouth shape should show at `time`.
///
/// - a time inside `[start, end]` of an interval selects it; on a boundary
///   shared by two intervals the earlier one wins
/// - a time inside a gap holds the interval before the gap
/// - a time past the final interval holds the final interval
/// - a time before the first interval, an empty timeline or a NaN time
///   resolve to `None`
///
/// Timelines are sorted and non-overlapping, so the search is a bisection
/// rather than a scan. The result only depends on the arguments.
pub fn resolve(timeline: &Timeline, time: f64) -> Option<usize> {
    let intervals = timeline.intervals();

    // First interval starting strictly after `time`
    let after = intervals.partition_point(|interval| interval.start <= time);
    if after == 0 {
        return None;
    }

    let candidate = after - 1;
    if candidate > 0 && intervals[candidate - 1].end >= time {
        // `time` sits exactly on the boundary the previous interval shares
        return Some(candidate - 1);
    }

    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VisemeInterval;
    use proptest::prelude::*;

    fn timeline(spans: &[(u32, f64, f64)]) -> Timeline {
        Timeline::new(
            spans
                .iter()
                .map(|&(viseme, start, end)| VisemeInterval::new(viseme, "", start, end))
                .collect(),
        )
        .unwrap()
    }

    /// First-match scan over the intervals, kept as the behavioural reference
    fn scan(timeline: &Timeline, time: f64) -> Option<usize> {
        for (i, interval) in timeline.iter().enumerate() {
            if interval.contains(time) {
                return Some(i);
            }
            if time < interval.start {
                return i.checked_sub(1);
            }
        }
        match timeline.intervals().last() {
            Some(last) if time > last.end => Some(timeline.len() - 1),
            _ => None,
        }
    }

    #[test]
    fn test_two_interval_scenario() {
        let tl = timeline(&[(1, 0.0, 0.5), (12, 0.5, 1.2)]);
        assert_eq!(resolve(&tl, 0.5), Some(0));
        assert_eq!(resolve(&tl, 0.6), Some(1));
        assert_eq!(resolve(&tl, 2.0), Some(1));
    }

    #[test]
    fn test_empty_timeline_never_resolves() {
        let tl = Timeline::empty();
        for time in [-1.0, 0.0, 0.5, 100.0] {
            assert_eq!(resolve(&tl, time), None);
        }
    }

    #[test]
    fn test_before_first_interval() {
        let tl = timeline(&[(3, 0.2, 0.4), (4, 0.4, 0.6)]);
        assert_eq!(resolve(&tl, 0.0), None);
        assert_eq!(resolve(&tl, 0.19), None);
        assert_eq!(resolve(&tl, 0.2), Some(0));
    }

    #[test]
    fn test_gap_holds_previous() {
        let tl = timeline(&[(1, 0.0, 0.2), (2, 0.5, 0.7), (3, 0.9, 1.0)]);
        assert_eq!(resolve(&tl, 0.3), Some(0));
        assert_eq!(resolve(&tl, 0.49), Some(0));
        assert_eq!(resolve(&tl, 0.8), Some(1));
        assert_eq!(resolve(&tl, 0.9), Some(2));
    }

    #[test]
    fn test_chained_boundaries_pick_earlier() {
        let tl = timeline(&[(1, 0.0, 0.1), (2, 0.1, 0.2), (3, 0.2, 0.3)]);
        assert_eq!(resolve(&tl, 0.1), Some(0));
        assert_eq!(resolve(&tl, 0.2), Some(1));
        assert_eq!(resolve(&tl, 0.3), Some(2));
    }

    #[test]
    fn test_nan_time() {
        let tl = timeline(&[(1, 0.0, 0.1)]);
        assert_eq!(resolve(&tl, f64::NAN), None);
        assert_eq!(scan(&tl, f64::NAN), None);
    }

    fn arb_timeline() -> impl Strategy<Value = Timeline> {
        // (gap before, length, viseme) per interval; gaps of zero produce shared boundaries
        prop::collection::vec((0u32..4, 1u32..6, 0u32..20), 0..12).prop_map(|parts| {
            let mut cursor = 0.0;
            let mut intervals = Vec::with_capacity(parts.len());
            for (gap, len, viseme) in parts {
                let start = cursor + gap as f64 * 0.1;
                let end = start + len as f64 * 0.1;
                intervals.push(VisemeInterval::new(viseme, "", start, end));
                cursor = end;
            }
            Timeline::new(intervals).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_matches_linear_scan(tl in arb_timeline(), time in -1.0f64..6.0) {
            prop_assert_eq!(resolve(&tl, time), scan(&tl, time));
        }

        #[test]
        fn prop_shared_boundaries_match_earlier(tl in arb_timeline()) {
            for i in 1..tl.len() {
                let prev = tl.get(i - 1).unwrap();
                let next = tl.get(i).unwrap();
                if prev.end == next.start {
                    prop_assert_eq!(resolve(&tl, next.start), Some(i - 1));
                }
            }
        }

        #[test]
        fn prop_past_end_holds_last(tl in arb_timeline(), extra in 0.001f64..10.0) {
            let expected = tl.len().checked_sub(1);
            prop_assert_eq!(resolve(&tl, tl.duration() + extra), expected);
        }

        #[test]
        fn prop_before_start_is_none(tl in arb_timeline(), before in 0.001f64..10.0) {
            if let Some(first) = tl.get(0) {
                prop_assert_eq!(resolve(&tl, first.start - before), None);
            }
        }

        #[test]
        fn prop_idempotent(tl in arb_timeline(), time in -1.0f64..6.0) {
            let first = resolve(&tl, time);
            prop_assert_eq!(resolve(&tl, time), first);
            prop_assert_eq!(resolve(&tl, time), first);
        }
    }
}
