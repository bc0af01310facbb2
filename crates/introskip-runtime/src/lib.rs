pub mod background;
pub mod content;
mod db;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use introskip_api::{IntroDbClient, TmdbClient};
use introskip_core::cache::MemorySegmentCache;
use introskip_core::config::AppConfig;
use introskip_core::storage::INTRODB_KEY;

pub use background::{Background, TabEvent};
pub use content::{ContentEvent, ContentSession, PageHost};
pub use db::DbHandle;
pub use protocol::{Request, Response};
pub use transport::BackgroundHandle;

/// The background service wired to the real HTTP clients.
pub type LiveBackground = Background<TmdbClient, IntroDbClient, MemorySegmentCache>;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
}

/// Config, storage and services for one process.
pub struct Runtime {
    config: AppConfig,
    db: DbHandle,
    background: Arc<LiveBackground>,
}

impl Runtime {
    pub async fn new() -> Result<Self, RuntimeError> {
        let config = AppConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let db_path =
            AppConfig::ensure_db_path().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let db = DbHandle::open(&db_path)
            .ok_or_else(|| RuntimeError::Database("failed to open database".into()))?;
        Self::with_parts(config, db).await
    }

    /// Build from an already loaded config and an open database.
    ///
    /// The segment database key comes from storage first, then from config.
    pub async fn with_parts(config: AppConfig, db: DbHandle) -> Result<Self, RuntimeError> {
        let stored_key = db
            .credential(INTRODB_KEY)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let api_key = stored_key.or_else(|| {
            let key = config.services.introdb.api_key.trim();
            (!key.is_empty()).then(|| key.to_string())
        });

        let introdb = IntroDbClient::new(&config.services.introdb.api_url, api_key)
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        let tmdb = TmdbClient::new(config.services.tmdb.token.clone());

        Ok(Self {
            config,
            db,
            background: Arc::new(Background::new(tmdb, introdb, MemorySegmentCache::new())),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> &DbHandle {
        &self.db
    }

    pub fn background(&self) -> &Arc<LiveBackground> {
        &self.background
    }

    /// Start the background message loop. Must be called inside a tokio runtime.
    pub fn spawn_background(&self) -> BackgroundHandle {
        BackgroundHandle::spawn(self.background.clone())
    }
}
