//! Segment database responses to canonical millisecond segments.
//!
//! The database has shipped two shapes per kind: a single object (older
//! API) and a list of objects (current). Each object carries either
//! `start_ms`/`end_ms` or `start`/`end` in seconds. Everything is turned into
//! [`NormalizedSegments`] here and nowhere else.

use serde_json::Value;

use introskip_api::{SegmentKind, SegmentQuery, SegmentService};

use crate::models::{NormalizedSegments, Segment};

/// Result of a segment lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentFetch {
    Segments(NormalizedSegments),
    NoData,
}

/// Fetch and normalize segments. Any failure or an empty result is `NoData`.
pub async fn fetch_segments<S: SegmentService>(service: &S, query: &SegmentQuery) -> SegmentFetch {
    match service.fetch_segments(query).await {
        Ok(raw) => {
            let segments = normalize_response(&raw);
            if segments.is_empty() {
                tracing::debug!(catalog_id = query.catalog_id, "No usable segments");
                SegmentFetch::NoData
            } else {
                tracing::debug!(
                    catalog_id = query.catalog_id,
                    count = segments.len(),
                    "Segments normalized"
                );
                SegmentFetch::Segments(segments)
            }
        }
        Err(e) => {
            tracing::debug!(catalog_id = query.catalog_id, error = %e, "Segment fetch failed");
            SegmentFetch::NoData
        }
    }
}

/// Normalize a raw response body. Malformed entries are dropped silently.
pub fn normalize_response(raw: &Value) -> NormalizedSegments {
    let mut out = NormalizedSegments::new();
    for &kind in SegmentKind::ALL {
        let entries: Vec<&Value> = match raw.get(kind.as_str()) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(obj @ Value::Object(_)) => vec![obj],
            _ => continue,
        };
        for entry in entries {
            match normalize_entry(kind, entry) {
                Some(segment) => {
                    if !out.insert(segment) {
                        tracing::trace!(kind = %kind, start_ms = segment.start_ms, "Overlapping segment dropped");
                    }
                }
                None => tracing::trace!(kind = %kind, "Malformed segment dropped"),
            }
        }
    }
    out
}

/// Canonicalize one raw entry, or `None` when it breaks the kind's rules.
///
/// Intro and recap need a positive end after the start; a missing start
/// means 0. Credits and preview need a start; a missing, null or
/// non-positive end means the segment runs to the end of the video.
pub fn normalize_entry(kind: SegmentKind, entry: &Value) -> Option<Segment> {
    let start = timestamp_ms(entry, "start_ms", "start");
    let end = timestamp_ms(entry, "end_ms", "end");

    let start_ms = match start {
        Some(ms) if ms < 0 => return None,
        Some(ms) => ms as u64,
        None if kind.allows_open_end() => return None,
        None => 0,
    };

    let end_ms = if kind.allows_open_end() {
        match end {
            Some(ms) if ms <= 0 => None,
            Some(ms) if ms as u64 <= start_ms => return None,
            Some(ms) => Some(ms as u64),
            None => None,
        }
    } else {
        match end {
            Some(ms) if ms > 0 && ms as u64 > start_ms => Some(ms as u64),
            _ => return None,
        }
    };

    Some(Segment {
        kind,
        start_ms,
        end_ms,
    })
}

/// Read a timestamp in ms, preferring the `*_ms` field over seconds.
fn timestamp_ms(entry: &Value, ms_key: &str, sec_key: &str) -> Option<i64> {
    if let Some(ms) = entry.get(ms_key).and_then(Value::as_f64) {
        return finite_round(ms);
    }
    entry
        .get(sec_key)
        .and_then(Value::as_f64)
        .and_then(|sec| finite_round(sec * 1000.0))
}

fn finite_round(x: f64) -> Option<i64> {
    x.is_finite().then(|| x.round() as i64)
}
