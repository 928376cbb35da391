//! `SQLite`-backed store implementations.
//!
//! One [`SqliteStore`] implements all three engine store traits over a
//! single connection behind a mutex. The engine is cron-invoked and
//! single-threaded within a run, so there is no pool; the mutex exists for
//! `Send + Sync` soundness, not throughput.
//!
//! Multi-row deletions (`delete_exact`, `delete_by_ids`) each run inside
//! one transaction so a crash cannot leave a half-applied batch.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use recap_core::ids::generate_id;
use recap_core::time::{parse_sortable, to_sortable};
use recap_core::{BufferMessage, Summary};
use recap_engine::{BufferStore, RunMarkerStore, StoreError, SummaryStore};

use crate::schema::SCHEMA;

/// `SQLite` store holding the rolling buffer, all summary stages, and the
/// run marker in one database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and bootstrap) a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::backend)?;
        Self::initialize(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = 5000;\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(StoreError::backend)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::backend)?;
        debug!("sqlite store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl BufferStore for SqliteStore {
    fn append(&self, message: &BufferMessage) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let _ = conn
            .execute(
                "INSERT INTO buffer_messages (sender, content, timestamp, platform, mode)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.sender,
                    message.content,
                    to_sortable(message.timestamp),
                    message.platform,
                    message.mode,
                ],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    fn read_all_ordered(&self) -> Result<Vec<BufferMessage>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT sender, content, timestamp, platform, mode
                 FROM buffer_messages ORDER BY timestamp ASC, id ASC",
            )
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(StoreError::backend)?;

        let mut messages = Vec::new();
        for row in rows {
            let (sender, content, raw_ts, platform, mode) = row.map_err(StoreError::backend)?;
            let timestamp = parse_sortable(&raw_ts).map_err(StoreError::backend)?;
            messages.push(BufferMessage {
                sender,
                content,
                timestamp,
                platform,
                mode,
            });
        }
        Ok(messages)
    }

    fn delete_exact(&self, subset: &[BufferMessage]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(StoreError::backend)?;
        {
            // One stored row per batch entry: duplicated messages in the
            // buffer survive one-for-one.
            let mut stmt = tx
                .prepare(
                    "DELETE FROM buffer_messages WHERE id = (
                         SELECT id FROM buffer_messages
                         WHERE sender = ?1 AND content = ?2 AND timestamp = ?3
                           AND platform = ?4 AND mode = ?5
                         ORDER BY id ASC LIMIT 1)",
                )
                .map_err(StoreError::backend)?;
            for message in subset {
                let _ = stmt
                    .execute(params![
                        message.sender,
                        message.content,
                        to_sortable(message.timestamp),
                        message.platform,
                        message.mode,
                    ])
                    .map_err(StoreError::backend)?;
            }
        }
        tx.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let _ = conn
            .execute("DELETE FROM buffer_messages", [])
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

impl SummaryStore for SqliteStore {
    fn insert(
        &self,
        content: &str,
        anchor_timestamp: DateTime<Utc>,
        stage: u32,
    ) -> Result<Summary, StoreError> {
        let summary = Summary {
            id: generate_id("sum"),
            content: content.to_owned(),
            anchor_timestamp,
            stage,
        };
        let conn = self.conn.lock();
        let _ = conn
            .execute(
                "INSERT INTO summaries (id, content, anchor_timestamp, stage)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    summary.id,
                    summary.content,
                    to_sortable(summary.anchor_timestamp),
                    summary.stage,
                ],
            )
            .map_err(StoreError::backend)?;
        Ok(summary)
    }

    fn read_all_ordered(&self, stage: u32) -> Result<Vec<Summary>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, content, anchor_timestamp, stage FROM summaries
                 WHERE stage = ?1 ORDER BY anchor_timestamp ASC, id ASC",
            )
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map(params![stage], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                ))
            })
            .map_err(StoreError::backend)?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, content, raw_anchor, stage) = row.map_err(StoreError::backend)?;
            let anchor_timestamp = parse_sortable(&raw_anchor).map_err(StoreError::backend)?;
            summaries.push(Summary {
                id,
                content,
                anchor_timestamp,
                stage,
            });
        }
        Ok(summaries)
    }

    fn delete_by_ids(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(StoreError::backend)?;
        {
            let mut stmt = tx
                .prepare("DELETE FROM summaries WHERE id = ?1")
                .map_err(StoreError::backend)?;
            for id in ids {
                let _ = stmt.execute(params![id]).map_err(StoreError::backend)?;
            }
        }
        tx.commit().map_err(StoreError::backend)?;
        Ok(())
    }
}

impl RunMarkerStore for SqliteStore {
    fn get(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.conn.lock();
        let raw: Option<String> = conn
            .query_row("SELECT last_run_at FROM run_marker WHERE id = 0", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StoreError::backend)?;
        raw.map(|ts| parse_sortable(&ts).map_err(StoreError::backend))
            .transpose()
    }

    fn set(&self, timestamp: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let _ = conn
            .execute(
                "INSERT INTO run_marker (id, last_run_at) VALUES (0, ?1)
                 ON CONFLICT(id) DO UPDATE SET last_run_at = excluded.last_run_at",
                params![to_sortable(timestamp)],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
