use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use introskip_core::error::IntroSkipError;
use introskip_core::models::{SegmentKind, SkipStats};
use introskip_core::storage::Storage;

/// Cloneable handle to the storage actor thread.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    RecordSkip {
        kind: SegmentKind,
        saved_ms: u64,
        reply: oneshot::Sender<Result<(), IntroSkipError>>,
    },
    GetSkipStats {
        reply: oneshot::Sender<Result<SkipStats, IntroSkipError>>,
    },
    ResetSkipStats {
        reply: oneshot::Sender<Result<(), IntroSkipError>>,
    },
    GetCredential {
        name: String,
        reply: oneshot::Sender<Result<Option<String>, IntroSkipError>>,
    },
    SetCredential {
        name: String,
        value: String,
        reply: oneshot::Sender<Result<(), IntroSkipError>>,
    },
    ClearCredential {
        name: String,
        reply: oneshot::Sender<Result<bool, IntroSkipError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Option<Self> {
        let storage = Storage::open(path)
            .map_err(|e| tracing::error!("Failed to open database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    /// Run `storage` on a dedicated thread.
    pub fn spawn(storage: Storage) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| tracing::error!("Failed to spawn DB thread: {e}"))
            .ok()?;

        Some(Self { tx })
    }

    pub async fn record_skip(&self, kind: SegmentKind, saved_ms: u64) -> Result<(), IntroSkipError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::RecordSkip {
            kind,
            saved_ms,
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn skip_stats(&self) -> Result<SkipStats, IntroSkipError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::GetSkipStats { reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn reset_skip_stats(&self) -> Result<(), IntroSkipError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::ResetSkipStats { reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn credential(&self, name: &str) -> Result<Option<String>, IntroSkipError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::GetCredential {
            name: name.to_string(),
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn set_credential(&self, name: &str, value: &str) -> Result<(), IntroSkipError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::SetCredential {
            name: name.to_string(),
            value: value.to_string(),
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn clear_credential(&self, name: &str) -> Result<bool, IntroSkipError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::ClearCredential {
            name: name.to_string(),
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }
}

fn closed() -> IntroSkipError {
    IntroSkipError::Config("DB actor closed".into())
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::RecordSkip {
                kind,
                saved_ms,
                reply,
            } => {
                let _ = reply.send(storage.record_skip(kind, saved_ms));
            }
            DbCommand::GetSkipStats { reply } => {
                let _ = reply.send(storage.skip_stats());
            }
            DbCommand::ResetSkipStats { reply } => {
                let _ = reply.send(storage.reset_skip_stats());
            }
            DbCommand::GetCredential { name, reply } => {
                let _ = reply.send(storage.credential(&name));
            }
            DbCommand::SetCredential { name, value, reply } => {
                let _ = reply.send(storage.set_credential(&name, &value));
            }
            DbCommand::ClearCredential { name, reply } => {
                let _ = reply.send(storage.clear_credential(&name));
            }
        }
    }
    tracing::debug!("DB actor stopped");
}
