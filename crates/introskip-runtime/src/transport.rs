//! Message passing between content sessions and the background service.
//!
//! The background runs as a task that owns the [`Background`] value. Each
//! request gets its own reply channel; when the background is gone every
//! call resolves immediately instead of waiting.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use introskip_api::{CatalogService, SegmentService};
use introskip_core::cache::{SegmentCache, TabId};
use introskip_core::models::{DiscoveryResult, MediaContext};

use crate::background::{Background, TabEvent};
use crate::protocol::{Request, Response};

enum Message {
    Request {
        tab: TabId,
        request: Request,
        reply: oneshot::Sender<Response>,
    },
    TabEvent {
        tab: TabId,
        event: TabEvent,
    },
}

#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl BackgroundHandle {
    /// Start the background task. Must be called inside a tokio runtime.
    ///
    /// Requests are served concurrently so a slow resolution never delays a
    /// cache lookup from another tab. Tab events are applied in arrival order.
    pub fn spawn<C, S, K>(background: Arc<Background<C, S, K>>) -> Self
    where
        C: CatalogService + 'static,
        S: SegmentService + 'static,
        K: SegmentCache + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Request {
                        tab,
                        request,
                        reply,
                    } => {
                        let background = background.clone();
                        tokio::spawn(async move {
                            let response = background.handle(tab, request).await;
                            let _ = reply.send(response);
                        });
                    }
                    Message::TabEvent { tab, event } => background.on_tab_event(tab, event),
                }
            }
            tracing::debug!("Background channel closed");
        });
        Self { tx }
    }

    /// Send a request. `None` when the background is gone.
    pub async fn request(&self, tab: TabId, request: Request) -> Option<Response> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Request {
                tab,
                request,
                reply,
            })
            .ok()?;
        rx.await.ok()
    }

    pub fn tab_event(&self, tab: TabId, event: TabEvent) {
        let _ = self.tx.send(Message::TabEvent { tab, event });
    }

    /// Resolve `ctx` for `tab`. An unreachable background yields an error status.
    pub async fn resolve_and_fetch(&self, tab: TabId, ctx: MediaContext) -> DiscoveryResult {
        self.request(tab, Request::ResolveAndFetch(ctx))
            .await
            .and_then(Response::into_discovery)
            .unwrap_or_else(DiscoveryResult::error)
    }

    /// Cached result for `tab`, or no data.
    pub async fn stored_intro_data(&self, tab: TabId) -> DiscoveryResult {
        self.request(tab, Request::GetStoredIntroData)
            .await
            .and_then(Response::into_discovery)
            .unwrap_or_else(|| DiscoveryResult::no_data(None))
    }

    /// A handle whose background has already stopped.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self { tx }
    }
}
