use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use introskip_api::SegmentKind;

/// Skip counter for one segment kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    pub count: u64,
    pub saved_ms: u64,
}

/// Locally recorded skips, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipStats {
    pub by_kind: BTreeMap<SegmentKind, KindStats>,
}

impl SkipStats {
    pub fn get(&self, kind: SegmentKind) -> KindStats {
        self.by_kind.get(&kind).copied().unwrap_or_default()
    }

    pub fn total_count(&self) -> u64 {
        self.by_kind.values().map(|s| s.count).sum()
    }

    pub fn total_saved_ms(&self) -> u64 {
        self.by_kind.values().map(|s| s.saved_ms).sum()
    }
}

/// `1h 2m 3s` style rendering of a millisecond duration.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}h "));
    }
    if m > 0 {
        out.push_str(&format!("{m}m "));
    }
    out.push_str(&format!("{s}s"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut stats = SkipStats::default();
        stats.by_kind.insert(
            SegmentKind::Intro,
            KindStats {
                count: 3,
                saved_ms: 180_000,
            },
        );
        stats.by_kind.insert(
            SegmentKind::Credits,
            KindStats {
                count: 1,
                saved_ms: 300_000,
            },
        );
        assert_eq!(stats.total_count(), 4);
        assert_eq!(stats.total_saved_ms(), 480_000);
        assert_eq!(stats.get(SegmentKind::Recap), KindStats::default());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59_999), "59s");
        assert_eq!(format_duration(480_000), "8m 0s");
        assert_eq!(format_duration(3_723_000), "1h 2m 3s");
    }
}
