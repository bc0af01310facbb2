//! In-memory services shared by the runtime tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use introskip_api::{
    CatalogHit, CatalogService, CommunityStats, EpisodeRef, SegmentQuery, SegmentService,
    ShowDetails, Submission, UserStats,
};
use introskip_core::models::{MediaKind, SegmentKind};
use introskip_core::monitor::VideoSnapshot;
use introskip_detect::PageSignals;

use crate::content::PageHost;

#[derive(Debug, thiserror::Error)]
#[error("fake service failure")]
pub struct FakeError;

/// Catalog that knows one show and counts searches.
pub struct FakeCatalog {
    pub hits: Vec<CatalogHit>,
    pub searches: AtomicUsize,
}

impl CatalogService for FakeCatalog {
    type Error = FakeError;

    async fn search(
        &self,
        _title: &str,
        _kind: MediaKind,
        _year: Option<&str>,
    ) -> Result<Vec<CatalogHit>, FakeError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.clone())
    }

    async fn show_details(&self, id: u64) -> Result<ShowDetails, FakeError> {
        Ok(ShowDetails { id, season_count: 1 })
    }

    async fn season_episodes(&self, _id: u64, _season: u32) -> Result<Vec<EpisodeRef>, FakeError> {
        Err(FakeError)
    }
}

pub fn dark_catalog() -> FakeCatalog {
    FakeCatalog {
        hits: vec![CatalogHit {
            id: 70523,
            title: "Dark".into(),
            release_date: "2017-12-01".into(),
        }],
        searches: AtomicUsize::new(0),
    }
}

/// Catalog whose searches take `delay` before answering.
pub struct SlowCatalog {
    inner: FakeCatalog,
    delay: Duration,
}

impl SlowCatalog {
    pub fn new(inner: FakeCatalog, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl CatalogService for SlowCatalog {
    type Error = FakeError;

    async fn search(
        &self,
        title: &str,
        kind: MediaKind,
        year: Option<&str>,
    ) -> Result<Vec<CatalogHit>, FakeError> {
        tokio::time::sleep(self.delay).await;
        self.inner.search(title, kind, year).await
    }

    async fn show_details(&self, id: u64) -> Result<ShowDetails, FakeError> {
        self.inner.show_details(id).await
    }

    async fn season_episodes(&self, id: u64, season: u32) -> Result<Vec<EpisodeRef>, FakeError> {
        self.inner.season_episodes(id, season).await
    }
}

/// Segment database that answers `{}` for the first `empty_calls` fetches,
/// then a 0-60 s intro.
#[derive(Default)]
pub struct FakeSegments {
    pub empty_calls: usize,
    pub calls: AtomicUsize,
    pub submissions: Mutex<Vec<Submission>>,
}

pub fn intro_db() -> FakeSegments {
    FakeSegments::default()
}

pub fn intro_json() -> Value {
    json!({ "intro": [{ "start_ms": 0, "end_ms": 60000 }] })
}

impl SegmentService for FakeSegments {
    type Error = FakeError;

    async fn fetch_segments(&self, _query: &SegmentQuery) -> Result<Value, FakeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.empty_calls {
            Ok(json!({}))
        } else {
            Ok(intro_json())
        }
    }

    async fn submit(&self, submission: &Submission) -> Result<(), FakeError> {
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn community_stats(&self) -> Result<CommunityStats, FakeError> {
        Ok(CommunityStats::default())
    }

    async fn user_stats(&self) -> Result<UserStats, FakeError> {
        Err(FakeError)
    }
}

/// Segment database with nothing in it.
pub struct EmptySegments;

impl SegmentService for EmptySegments {
    type Error = FakeError;

    async fn fetch_segments(&self, _query: &SegmentQuery) -> Result<Value, FakeError> {
        Ok(json!({}))
    }

    async fn submit(&self, _submission: &Submission) -> Result<(), FakeError> {
        Err(FakeError)
    }

    async fn community_stats(&self) -> Result<CommunityStats, FakeError> {
        Err(FakeError)
    }

    async fn user_stats(&self) -> Result<UserStats, FakeError> {
        Err(FakeError)
    }
}

/// What a [`FakePage`] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    Show(SegmentKind),
    Hide,
    Seek(f64),
}

/// A page with a settable video position.
pub struct FakePage {
    pub signals: PageSignals,
    pub video: Mutex<Option<VideoSnapshot>>,
    pub calls: Mutex<Vec<PageCall>>,
}

impl FakePage {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            signals: PageSignals::new(url, title, "", 0.0),
            video: Mutex::new(Some(VideoSnapshot::new(0.0, 3000.0))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_time(&self, seconds: f64) {
        *self.video.lock().unwrap() = Some(VideoSnapshot::new(seconds, 3000.0));
    }

    pub fn remove_video(&self) {
        *self.video.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageHost for FakePage {
    fn signals(&self) -> PageSignals {
        self.signals.clone()
    }

    fn video_snapshot(&self) -> Option<VideoSnapshot> {
        *self.video.lock().unwrap()
    }

    fn seek(&self, seconds: f64) {
        self.calls.lock().unwrap().push(PageCall::Seek(seconds));
        self.set_time(seconds);
    }

    fn show_skip(&self, kind: SegmentKind, _label: &str) {
        self.calls.lock().unwrap().push(PageCall::Show(kind));
    }

    fn hide_skip(&self) {
        self.calls.lock().unwrap().push(PageCall::Hide);
    }
}
