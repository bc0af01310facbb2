//! Per-page content session.
//!
//! One session runs per page view: it extracts the media context once,
//! asks the background for segments (at most one resolution in flight),
//! keeps retrying on a bounded schedule while nothing is known, and polls
//! the video to drive the skip control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use introskip_core::cache::TabId;
use introskip_core::config::PlaybackConfig;
use introskip_core::models::{DiscoveryResult, DiscoveryStatus, MediaContext, SegmentKind};
use introskip_core::monitor::{skip_label, MonitorAction, PlaybackMonitor, VideoSnapshot};
use introskip_detect::PageSignals;

use crate::db::DbHandle;
use crate::protocol::{Request, Response};
use crate::transport::BackgroundHandle;

/// The page a session runs in.
///
/// `video_snapshot` is called on every tick and must look the player up
/// again each time, since players get re-mounted around ads.
pub trait PageHost: Send + Sync + 'static {
    fn signals(&self) -> PageSignals;

    /// The playing video, else the first one. `None` when the page has none.
    fn video_snapshot(&self) -> Option<VideoSnapshot>;

    fn seek(&self, seconds: f64);

    fn show_skip(&self, kind: SegmentKind, label: &str);

    fn hide_skip(&self);
}

/// Input from the page while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEvent {
    SkipClicked,
    /// Page unloaded.
    Stop,
}

pub struct ContentSession<H: PageHost> {
    host: Arc<H>,
    background: BackgroundHandle,
    tab: TabId,
    playback: PlaybackConfig,
    stats: Option<DbHandle>,
    context: Arc<Mutex<Option<MediaContext>>>,
    in_flight: Arc<AtomicBool>,
}

impl<H: PageHost> ContentSession<H> {
    pub fn new(host: Arc<H>, background: BackgroundHandle, tab: TabId, playback: PlaybackConfig) -> Self {
        Self {
            host,
            background,
            tab,
            playback,
            stats: None,
            context: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record skip statistics through `db`.
    pub fn with_stats(mut self, db: DbHandle) -> Self {
        self.stats = Some(db);
        self
    }

    /// The context extracted for this page view, once available.
    pub fn player_info(&self) -> Option<MediaContext> {
        self.context.lock().ok().and_then(|c| c.clone())
    }

    /// Answer requests addressed to the page. Everything else belongs to
    /// the background.
    pub fn respond(&self, request: &Request) -> Option<Response> {
        match request {
            Request::GetPlayerInfo => Some(Response::PlayerInfo(self.player_info())),
            _ => None,
        }
    }

    /// Drive the page until [`ContentEvent::Stop`] or the event channel closes.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<ContentEvent>) {
        time::sleep(self.playback.initial_delay()).await;

        let signals = self.host.signals();
        if introskip_detect::is_restricted_url(&signals.url) {
            tracing::debug!(url = %signals.url, "Restricted page, session idle");
            return;
        }
        let ctx = introskip_detect::extract_page(&signals);
        if let Ok(mut slot) = self.context.lock() {
            *slot = Some(ctx.clone());
        }

        let (found_tx, mut found_rx) = mpsc::unbounded_channel();
        let mut discovery = Some(self.spawn_discovery(ctx, found_tx));

        let mut monitor = PlaybackMonitor::new(self.playback.trailing_guard_ms);
        let mut ticker = time::interval(self.playback.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = self.host.video_snapshot();
                    let action = monitor.tick(snapshot.as_ref());
                    self.apply(action);
                }
                Some(result) = found_rx.recv() => {
                    if result.has_segments() {
                        if let Some(task) = discovery.take() {
                            task.abort();
                        }
                        let action = monitor.load(result.segments);
                        self.apply(action);
                    }
                }
                event = events.recv() => match event {
                    Some(ContentEvent::SkipClicked) => self.skip(&mut monitor).await,
                    Some(ContentEvent::Stop) | None => break,
                },
            }
        }

        if let Some(task) = discovery.take() {
            task.abort();
        }
        self.host.hide_skip();
        tracing::debug!(tab = self.tab, "Content session stopped");
    }

    fn apply(&self, action: MonitorAction) {
        match action {
            MonitorAction::Show(kind) => self.host.show_skip(kind, skip_label(kind)),
            MonitorAction::Hide => self.host.hide_skip(),
            MonitorAction::None => {}
        }
    }

    async fn skip(&self, monitor: &mut PlaybackMonitor) {
        let Some(snapshot) = self.host.video_snapshot() else {
            return;
        };
        let Some(outcome) = monitor.skip(&snapshot) else {
            return;
        };
        self.host.seek(outcome.seek_to_seconds);
        self.host.hide_skip();
        if let Some(db) = &self.stats {
            if let Err(e) = db.record_skip(outcome.kind, outcome.saved_ms).await {
                tracing::warn!("Failed to record skip: {e}");
            }
        }
    }

    fn spawn_discovery(
        &self,
        ctx: MediaContext,
        found: mpsc::UnboundedSender<DiscoveryResult>,
    ) -> JoinHandle<()> {
        let discovery = Discovery {
            host: self.host.clone(),
            background: self.background.clone(),
            tab: self.tab,
            playback: self.playback,
            in_flight: self.in_flight.clone(),
            found,
        };
        tokio::spawn(async move { discovery.run(ctx).await })
    }
}

/// Background half of a session: cache check, first resolution, retries.
struct Discovery<H> {
    host: Arc<H>,
    background: BackgroundHandle,
    tab: TabId,
    playback: PlaybackConfig,
    in_flight: Arc<AtomicBool>,
    found: mpsc::UnboundedSender<DiscoveryResult>,
}

impl<H: PageHost> Discovery<H> {
    async fn run(self, ctx: MediaContext) {
        let stored = self.background.stored_intro_data(self.tab).await;
        if stored.has_segments() {
            tracing::debug!(tab = self.tab, "Using cached segments");
            let _ = self.found.send(stored);
            return;
        }
        if !ctx.is_ready() {
            tracing::debug!(title = %ctx.title, "Title not ready, skipping resolution");
            return;
        }

        let deadline = Instant::now() + self.playback.retry_ceiling();
        let mut attempt = 0u32;
        loop {
            // Retries only make sense while a video is on the page.
            if attempt == 0 || self.host.video_snapshot().is_some() {
                if let Some(result) = self.resolve_once(&ctx).await {
                    match result.status {
                        DiscoveryStatus::Success => {
                            let _ = self.found.send(result);
                            return;
                        }
                        DiscoveryStatus::NotFound => {
                            tracing::info!(title = %ctx.title, "No catalog match");
                            return;
                        }
                        DiscoveryStatus::NoData | DiscoveryStatus::Error => {}
                    }
                }
            }
            attempt += 1;

            let next = Instant::now() + self.playback.retry_interval();
            if next > deadline {
                tracing::debug!(tab = self.tab, attempts = attempt, "Retry ceiling reached");
                return;
            }
            time::sleep_until(next).await;

            let stored = self.background.stored_intro_data(self.tab).await;
            if stored.has_segments() {
                let _ = self.found.send(stored);
                return;
            }
        }
    }

    /// One resolution, unless another is already running for this page.
    async fn resolve_once(&self, ctx: &MediaContext) -> Option<DiscoveryResult> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let result = self.background.resolve_and_fetch(self.tab, ctx.clone()).await;
        self.in_flight.store(false, Ordering::Release);
        tracing::debug!(tab = self.tab, status = %result.status, "Resolution attempt finished");
        Some(result)
    }
}
