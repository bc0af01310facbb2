use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use introskip_api::SegmentKind;

use crate::error::IntroSkipError;
use crate::models::{KindStats, SkipStats};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// Name under which the segment database API key is stored.
pub const INTRODB_KEY: &str = "introdb_api_key";

/// SQLite-backed local state: stored credentials and skip counters.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, IntroSkipError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, IntroSkipError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Credentials ─────────────────────────────────────────────

    pub fn credential(&self, name: &str) -> Result<Option<String>, IntroSkipError> {
        self.conn
            .query_row(
                "SELECT value FROM credentials WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Store a credential, replacing any previous value. Blank values are rejected.
    pub fn set_credential(&self, name: &str, value: &str) -> Result<(), IntroSkipError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(IntroSkipError::Config(format!("{name} cannot be empty")));
        }
        self.conn.execute(
            "INSERT INTO credentials (name, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at",
            params![name, value],
        )?;
        Ok(())
    }

    /// Remove a credential. Returns whether one was stored.
    pub fn clear_credential(&self, name: &str) -> Result<bool, IntroSkipError> {
        let n = self
            .conn
            .execute("DELETE FROM credentials WHERE name = ?1", params![name])?;
        Ok(n > 0)
    }

    // ── Skip stats ──────────────────────────────────────────────

    /// Count one skip of `kind` that saved `saved_ms`.
    ///
    /// A single upsert statement, so concurrent writers cannot lose updates.
    pub fn record_skip(&self, kind: SegmentKind, saved_ms: u64) -> Result<(), IntroSkipError> {
        let saved = i64::try_from(saved_ms).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO skip_stats (kind, count, saved_ms) VALUES (?1, 1, ?2)
             ON CONFLICT(kind) DO UPDATE SET
               count = count + 1,
               saved_ms = saved_ms + excluded.saved_ms",
            params![kind.as_str(), saved],
        )?;
        Ok(())
    }

    pub fn skip_stats(&self) -> Result<SkipStats, IntroSkipError> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, count, saved_ms FROM skip_stats")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .filter_map(|r| r.ok());

        let mut stats = SkipStats::default();
        for (kind, count, saved_ms) in rows {
            let Ok(kind) = kind.parse::<SegmentKind>() else {
                continue;
            };
            stats.by_kind.insert(
                kind,
                KindStats {
                    count: count.max(0) as u64,
                    saved_ms: saved_ms.max(0) as u64,
                },
            );
        }
        Ok(stats)
    }

    pub fn reset_skip_stats(&self) -> Result<(), IntroSkipError> {
        self.conn.execute("DELETE FROM skip_stats", [])?;
        Ok(())
    }
}

fn run_migrations(conn: &Connection) -> Result<(), IntroSkipError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}
