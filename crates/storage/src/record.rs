// SPDX-License-Identifier: MIT

//! The file record produced by a scan walker and persisted by the store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One indexed file: an absolute path plus the metadata a scan observed
/// about it.
///
/// `path` is the upsert key. Re-indexing the same path overwrites every
/// other field; it never creates a second row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub modified_at_ms: u64,
    /// 64 lowercase hex characters, or `fman_core::SENTINEL_HASH` for a
    /// file too large to hash.
    pub content_hash: String,
    pub indexed_at_ms: u64,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
