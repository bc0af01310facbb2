use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use introskip_api::SegmentKind;

/// End timestamps at or beyond this (24 h) mean "runs to the end of the video".
pub const OPEN_END_SENTINEL_MS: u64 = 86_400_000;

/// A time range within a video, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start_ms: u64,
    /// `None` runs to the end of the video. Greater than `start_ms` when set.
    pub end_ms: Option<u64>,
}

impl Segment {
    /// Where the segment stops, given the video duration.
    ///
    /// Open or sentinel ends resolve to the duration; `None` when the end is
    /// open and the duration is unknown.
    pub fn effective_end(&self, duration_ms: Option<u64>) -> Option<u64> {
        match self.end_ms {
            Some(end) if end < OPEN_END_SENTINEL_MS => Some(end),
            _ => duration_ms,
        }
    }
}

/// Segments grouped by kind, each list ordered by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSegments(BTreeMap<SegmentKind, Vec<Segment>>);

impl NormalizedSegments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment, keeping its kind's list sorted and free of overlaps.
    ///
    /// Returns `false` when the segment overlapped an existing one and was
    /// dropped.
    pub fn insert(&mut self, segment: Segment) -> bool {
        let list = self.0.entry(segment.kind).or_default();
        let overlaps = list.iter().any(|s| ranges_overlap(s, &segment));
        if overlaps {
            return false;
        }
        let pos = list.partition_point(|s| s.start_ms <= segment.start_ms);
        list.insert(pos, segment);
        true
    }

    pub fn get(&self, kind: SegmentKind) -> &[Segment] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// All segments in monitor priority order (intro, recap, credits, preview).
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        SegmentKind::ALL.iter().flat_map(|k| self.get(*k))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ranges_overlap(a: &Segment, b: &Segment) -> bool {
    let a_end = a.end_ms.unwrap_or(u64::MAX);
    let b_end = b.end_ms.unwrap_or(u64::MAX);
    a.start_ms < b_end && b.start_ms < a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(kind: SegmentKind, start_ms: u64, end_ms: Option<u64>) -> Segment {
        Segment {
            kind,
            start_ms,
            end_ms,
        }
    }

    #[test]
    fn test_effective_end() {
        let closed = seg(SegmentKind::Intro, 0, Some(60_000));
        assert_eq!(closed.effective_end(Some(1_000_000)), Some(60_000));

        let open = seg(SegmentKind::Credits, 5_000_000, None);
        assert_eq!(open.effective_end(Some(5_400_000)), Some(5_400_000));
        assert_eq!(open.effective_end(None), None);

        let sentinel = seg(SegmentKind::Credits, 5_000_000, Some(OPEN_END_SENTINEL_MS));
        assert_eq!(sentinel.effective_end(Some(5_400_000)), Some(5_400_000));
    }

    #[test]
    fn test_insert_sorted_and_non_overlapping() {
        let mut segs = NormalizedSegments::new();
        assert!(segs.insert(seg(SegmentKind::Recap, 90_000, Some(120_000))));
        assert!(segs.insert(seg(SegmentKind::Recap, 0, Some(30_000))));
        assert!(!segs.insert(seg(SegmentKind::Recap, 100_000, Some(110_000))));

        let starts: Vec<u64> = segs.get(SegmentKind::Recap).iter().map(|s| s.start_ms).collect();
        assert_eq!(starts, vec![0, 90_000]);
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn test_open_end_blocks_later_segments() {
        let mut segs = NormalizedSegments::new();
        assert!(segs.insert(seg(SegmentKind::Credits, 1_000, None)));
        assert!(!segs.insert(seg(SegmentKind::Credits, 2_000, Some(3_000))));
        assert!(segs.insert(seg(SegmentKind::Preview, 2_000, Some(3_000))));
    }

    #[test]
    fn test_iter_priority_order() {
        let mut segs = NormalizedSegments::new();
        segs.insert(seg(SegmentKind::Preview, 10, Some(20)));
        segs.insert(seg(SegmentKind::Intro, 30, Some(40)));
        segs.insert(seg(SegmentKind::Credits, 50, None));
        let kinds: Vec<SegmentKind> = segs.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SegmentKind::Intro, SegmentKind::Credits, SegmentKind::Preview]
        );
    }

    #[test]
    fn test_serializes_as_kind_map() {
        let mut segs = NormalizedSegments::new();
        segs.insert(seg(SegmentKind::Intro, 0, Some(1_000)));
        let json = serde_json::to_value(&segs).unwrap();
        assert_eq!(json["intro"][0]["start_ms"], 0);
        assert_eq!(json["intro"][0]["end_ms"], 1_000);
        assert!(NormalizedSegments::new().is_empty());
    }
}
