// SPDX-License-Identifier: MIT

//! SQLite-backed implementation of the metadata store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::record::FileRecord;

/// Keyed upsert-and-query interface the scan walker writes through.
///
/// `init` is idempotent: the core calls it once per scan invocation, and
/// it must be safe to call again against an already-initialized store.
pub trait MetadataStore {
    fn init(&self) -> Result<(), StoreError>;
    fn upsert(&self, record: &FileRecord) -> Result<(), StoreError>;
    fn close(&self) -> Result<(), StoreError>;
}

/// A [`MetadataStore`] backed by a single SQLite file.
///
/// The connection is wrapped in a [`Mutex`] rather than handed out per
/// call: scans are single-writer, and synchronous SQLite access behind a
/// lock is simpler than pooling for this load.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if absent) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// An in-memory store, for tests and scans of ephemeral trees.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Find every record whose basename matches `name` exactly.
    ///
    /// Consumed by external collaborators (e.g. a rule evaluator); not
    /// part of the walker's own contract.
    pub fn find_by_name(&self, name: &str) -> Result<Vec<FileRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT path, name, size_bytes, modified_at_ms, content_hash, indexed_at_ms
             FROM files WHERE name = ?1 ORDER BY path",
        )?;
        let rows = stmt
            .query_map(params![name], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Find records whose size falls within `[min_bytes, max_bytes]`.
    ///
    /// `max_bytes = None` means unbounded above.
    pub fn find_by_criteria(
        &self,
        min_bytes: u64,
        max_bytes: Option<u64>,
    ) -> Result<Vec<FileRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT path, name, size_bytes, modified_at_ms, content_hash, indexed_at_ms
             FROM files WHERE size_bytes >= ?1 AND (?2 IS NULL OR size_bytes <= ?2)
             ORDER BY path",
        )?;
        let rows = stmt
            .query_map(params![min_bytes, max_bytes], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Find every record carrying one of `hashes`, keyed by hash.
    pub fn find_files_with_hashes(
        &self,
        hashes: &[String],
    ) -> Result<Vec<FileRecord>, StoreError> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock();
        let placeholders = hashes.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT path, name, size_bytes, modified_at_ms, content_hash, indexed_at_ms
             FROM files WHERE content_hash IN ({placeholders}) ORDER BY path"
        );
        let mut stmt = conn.prepare(&sql)?;
        let params = rusqlite::params_from_iter(hashes.iter());
        let rows = stmt
            .query_map(params, row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Look up a single record by its exact path, mostly useful in tests.
    pub fn find_by_path(&self, path: &Path) -> Result<Option<FileRecord>, StoreError> {
        let conn = self.conn.lock();
        let path_str = path.to_string_lossy();
        conn.query_row(
            "SELECT path, name, size_bytes, modified_at_ms, content_hash, indexed_at_ms
             FROM files WHERE path = ?1",
            params![path_str],
            row_to_record,
        )
        .optional()
        .map_err(StoreError::from)
    }
}

impl MetadataStore for SqliteStore {
    fn init(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                path           TEXT PRIMARY KEY,
                name           TEXT NOT NULL,
                size_bytes     INTEGER NOT NULL,
                modified_at_ms INTEGER NOT NULL,
                content_hash   TEXT NOT NULL,
                indexed_at_ms  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS files_name_idx ON files(name);
            CREATE INDEX IF NOT EXISTS files_hash_idx ON files(content_hash);",
        )?;
        Ok(())
    }

    fn upsert(&self, record: &FileRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let path_str = record.path.to_string_lossy();
        conn.execute(
            "INSERT INTO files (path, name, size_bytes, modified_at_ms, content_hash, indexed_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(path) DO UPDATE SET
                name = excluded.name,
                size_bytes = excluded.size_bytes,
                modified_at_ms = excluded.modified_at_ms,
                content_hash = excluded.content_hash,
                indexed_at_ms = excluded.indexed_at_ms",
            params![
                path_str,
                record.name,
                record.size_bytes,
                record.modified_at_ms,
                record.content_hash,
                record.indexed_at_ms,
            ],
        )?;
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        // `Connection` closes on drop; nothing to flush explicitly for
        // SQLite's default journal mode. Kept as an explicit step so
        // callers don't need to know that.
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let path: String = row.get(0)?;
    Ok(FileRecord {
        path: PathBuf::from(path),
        name: row.get(1)?,
        size_bytes: row.get(2)?,
        modified_at_ms: row.get(3)?,
        content_hash: row.get(4)?,
        indexed_at_ms: row.get(5)?,
    })
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
