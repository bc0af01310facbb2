//! Background service: resolves contexts for tabs and owns the per-tab cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use introskip_api::{CatalogService, SegmentService};
use introskip_core::cache::{SegmentCache, TabId};
use introskip_core::discovery;
use introskip_core::models::{DiscoveryResult, DiscoveryStatus, MediaContext};

use crate::protocol::{Request, Response};

/// Browser tab lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    Navigated { url: String },
    Closed,
}

/// What the background knows about one tab.
///
/// `generation` changes on every navigation; a resolution started under an
/// older generation must not write the cache.
#[derive(Debug)]
struct TabState {
    url: Option<String>,
    context: Option<MediaContext>,
    generation: u64,
}

impl TabState {
    fn new(generation: u64) -> Self {
        Self {
            url: None,
            context: None,
            generation,
        }
    }
}

pub struct Background<C, S, K> {
    catalog: C,
    segment_db: S,
    cache: K,
    tabs: Mutex<HashMap<TabId, TabState>>,
    generations: AtomicU64,
}

impl<C, S, K> Background<C, S, K>
where
    C: CatalogService,
    S: SegmentService,
    K: SegmentCache,
{
    pub fn new(catalog: C, segment_db: S, cache: K) -> Self {
        Self {
            catalog,
            segment_db,
            cache,
            tabs: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn segment_db(&self) -> &S {
        &self.segment_db
    }

    pub fn cache(&self) -> &K {
        &self.cache
    }

    /// Answer one request from `tab`.
    pub async fn handle(&self, tab: TabId, request: Request) -> Response {
        match request {
            Request::GetPlayerInfo => {
                let context = self.tabs().get(&tab).and_then(|t| t.context.clone());
                Response::PlayerInfo(context)
            }
            Request::ResolveAndFetch(ctx) => {
                let generation = {
                    let mut tabs = self.tabs();
                    let state = tabs
                        .entry(tab)
                        .or_insert_with(|| TabState::new(self.next_generation()));
                    state.context = Some(ctx.clone());
                    state.generation
                };
                let result = discovery::resolve_and_fetch(&self.catalog, &self.segment_db, &ctx).await;
                if result.status == DiscoveryStatus::Success {
                    let tabs = self.tabs();
                    if tabs.get(&tab).map(|t| t.generation) == Some(generation) {
                        self.cache.set(tab, result.clone());
                    } else {
                        tracing::debug!(tab, "Tab moved on during resolution, not caching");
                    }
                }
                Response::Discovery(result)
            }
            Request::GetStoredIntroData => {
                let result = self
                    .cache
                    .get(tab)
                    .unwrap_or_else(|| DiscoveryResult::no_data(None));
                Response::Discovery(result)
            }
        }
    }

    /// Invalidate cached state when a tab leaves its page.
    ///
    /// Navigation only clears the entry when the URL actually changed.
    pub fn on_tab_event(&self, tab: TabId, event: TabEvent) {
        match event {
            TabEvent::Navigated { url } => {
                let mut tabs = self.tabs();
                let state = tabs
                    .entry(tab)
                    .or_insert_with(|| TabState::new(self.next_generation()));
                if state.url.as_deref() == Some(url.as_str()) {
                    return;
                }
                tracing::debug!(tab, url = %url, "Tab navigated");
                state.url = Some(url);
                state.context = None;
                state.generation = self.next_generation();
                drop(tabs);
                self.cache.delete(tab);
            }
            TabEvent::Closed => {
                self.tabs().remove(&tab);
                self.cache.delete(tab);
                tracing::debug!(tab, "Tab closed");
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn tabs(&self) -> MutexGuard<'_, HashMap<TabId, TabState>> {
        self.tabs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
