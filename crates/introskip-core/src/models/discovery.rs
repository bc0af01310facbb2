use serde::{Deserialize, Serialize};

use super::segment::NormalizedSegments;

/// Outcome of one resolve-and-fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    /// Segments were found.
    Success,
    /// The title matched but the database knows no segments for it.
    NoData,
    /// No catalog match.
    NotFound,
    /// The attempt itself failed (worker gone, task aborted).
    Error,
}

impl DiscoveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoData => "no_data",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for DiscoveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the background service returns and caches per tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub status: DiscoveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<u64>,
    #[serde(default)]
    pub segments: NormalizedSegments,
}

impl DiscoveryResult {
    pub fn success(catalog_id: u64, segments: NormalizedSegments) -> Self {
        Self {
            status: DiscoveryStatus::Success,
            catalog_id: Some(catalog_id),
            segments,
        }
    }

    pub fn no_data(catalog_id: Option<u64>) -> Self {
        Self {
            status: DiscoveryStatus::NoData,
            catalog_id,
            segments: NormalizedSegments::default(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: DiscoveryStatus::NotFound,
            catalog_id: None,
            segments: NormalizedSegments::default(),
        }
    }

    pub fn error() -> Self {
        Self {
            status: DiscoveryStatus::Error,
            catalog_id: None,
            segments: NormalizedSegments::default(),
        }
    }

    /// Successful and carrying at least one segment.
    pub fn has_segments(&self) -> bool {
        self.status == DiscoveryStatus::Success && !self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;
    use introskip_api::SegmentKind;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&DiscoveryResult::not_found()).unwrap();
        assert_eq!(json, r#"{"status":"not_found","segments":{}}"#);

        let parsed: DiscoveryResult =
            serde_json::from_str(r#"{"status":"no_data","catalog_id":42}"#).unwrap();
        assert_eq!(parsed, DiscoveryResult::no_data(Some(42)));
    }

    #[test]
    fn test_has_segments() {
        assert!(!DiscoveryResult::no_data(Some(1)).has_segments());
        assert!(!DiscoveryResult::success(1, NormalizedSegments::new()).has_segments());

        let mut segs = NormalizedSegments::new();
        segs.insert(Segment {
            kind: SegmentKind::Intro,
            start_ms: 0,
            end_ms: Some(10_000),
        });
        assert!(DiscoveryResult::success(1, segs).has_segments());
    }
}
