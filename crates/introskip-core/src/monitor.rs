//! Playback monitor: decides when the skip control is visible.
//!
//! ```text
//!   Idle ──load(non-empty)──▶ Armed ──segment active──▶ Showing{kind, target}
//!    ▲                          ▲                              │
//!    └──────load(empty)─────────┴──── skip / segment exit ─────┘
//! ```
//!
//! The monitor holds no video handle. Each tick receives a fresh
//! [`VideoSnapshot`] (or `None` while no video element exists).

use serde::{Deserialize, Serialize};

use introskip_api::SegmentKind;

use crate::models::NormalizedSegments;

/// Default trailing guard: a segment stops being active this long before its end.
pub const DEFAULT_TRAILING_GUARD_MS: u64 = 500;

/// Playback state read from the page on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSnapshot {
    pub current_seconds: f64,
    /// `NaN` or non-positive while the player has not loaded metadata.
    pub duration_seconds: f64,
}

impl VideoSnapshot {
    pub fn new(current_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            current_seconds,
            duration_seconds,
        }
    }

    fn now_ms(&self) -> Option<u64> {
        to_ms(self.current_seconds)
    }

    fn duration_ms(&self) -> Option<u64> {
        to_ms(self.duration_seconds).filter(|&d| d > 0)
    }
}

fn to_ms(seconds: f64) -> Option<u64> {
    (seconds.is_finite() && seconds >= 0.0).then(|| (seconds * 1000.0).round() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No segments known.
    Idle,
    /// Segments loaded, control hidden.
    Armed,
    /// Control visible for `kind`; skipping seeks to `target_ms`.
    Showing { kind: SegmentKind, target_ms: u64 },
}

/// What the page should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorAction {
    Show(SegmentKind),
    Hide,
    None,
}

/// Result of a skip click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipOutcome {
    pub kind: SegmentKind,
    pub seek_to_seconds: f64,
    pub saved_ms: u64,
}

/// Label shown on the skip control.
pub fn skip_label(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Intro => "Skip Intro",
        SegmentKind::Recap => "Skip Recap",
        SegmentKind::Credits => "Skip Credits",
        SegmentKind::Preview => "Skip Preview",
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackMonitor {
    segments: NormalizedSegments,
    state: MonitorState,
    guard_ms: u64,
}

impl Default for PlaybackMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_TRAILING_GUARD_MS)
    }
}

impl PlaybackMonitor {
    pub fn new(guard_ms: u64) -> Self {
        Self {
            segments: NormalizedSegments::new(),
            state: MonitorState::Idle,
            guard_ms,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn segments(&self) -> &NormalizedSegments {
        &self.segments
    }

    /// Replace the known segments. Any visible control must be hidden by the
    /// caller when this returns `Hide`.
    pub fn load(&mut self, segments: NormalizedSegments) -> MonitorAction {
        let was_showing = matches!(self.state, MonitorState::Showing { .. });
        self.state = if segments.is_empty() {
            MonitorState::Idle
        } else {
            MonitorState::Armed
        };
        self.segments = segments;
        if was_showing {
            MonitorAction::Hide
        } else {
            MonitorAction::None
        }
    }

    /// The segment that should own the control right now, with its seek target.
    ///
    /// Kinds are checked in priority order and the first active one wins. A
    /// segment is active while `start <= now < effective_end - guard`.
    pub fn active(&self, snapshot: &VideoSnapshot) -> Option<(SegmentKind, u64)> {
        let now = snapshot.now_ms()?;
        let duration = snapshot.duration_ms();
        self.segments.iter().find_map(|seg| {
            let end = seg.effective_end(duration)?;
            let active = seg.start_ms <= now && now < end.saturating_sub(self.guard_ms);
            active.then_some((seg.kind, end))
        })
    }

    /// Advance the state machine by one poll.
    pub fn tick(&mut self, snapshot: Option<&VideoSnapshot>) -> MonitorAction {
        if self.state == MonitorState::Idle {
            return MonitorAction::None;
        }
        let active = snapshot.and_then(|s| self.active(s));
        match (self.state, active) {
            (MonitorState::Showing { kind, target_ms }, Some((k, t))) if kind == k && target_ms == t => {
                MonitorAction::None
            }
            (_, Some((kind, target_ms))) => {
                tracing::debug!(kind = %kind, target_ms, "Segment active");
                self.state = MonitorState::Showing { kind, target_ms };
                MonitorAction::Show(kind)
            }
            (MonitorState::Showing { .. }, None) => {
                self.state = MonitorState::Armed;
                MonitorAction::Hide
            }
            (_, None) => MonitorAction::None,
        }
    }

    /// Handle a skip click: jump to the shown segment's end.
    ///
    /// Returns `None` when no control is showing.
    pub fn skip(&mut self, snapshot: &VideoSnapshot) -> Option<SkipOutcome> {
        let MonitorState::Showing { kind, target_ms } = self.state else {
            return None;
        };
        let now = snapshot.now_ms().unwrap_or(0);
        self.state = MonitorState::Armed;
        let outcome = SkipOutcome {
            kind,
            seek_to_seconds: target_ms as f64 / 1000.0,
            saved_ms: target_ms.saturating_sub(now),
        };
        tracing::info!(kind = %kind, seek_to = outcome.seek_to_seconds, saved_ms = outcome.saved_ms, "Skipped segment");
        Some(outcome)
    }
}
