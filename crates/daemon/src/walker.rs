// SPDX-License-Identifier: MIT

//! Recursive, depth-first scan of a root path: traversal filtering,
//! streamed SHA-256 hashing, and metadata-store upserts.

use std::io::Read;
use std::path::{Path, PathBuf};

use fman_core::{ScanOptions, ScanProgress, ScanStatistics, SENTINEL_HASH};
use fman_storage::{FileRecord, MetadataStore};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::traversal_filter;

/// Bytes read per hashing chunk.
const HASH_CHUNK_BYTES: usize = 32 * 1024;
/// Throttle-delay cadence: every Nth file processed.
const THROTTLE_EVERY_N_FILES: u64 = 100;
/// Memory-sample/GC-hint cadence: every Nth file processed.
const GC_HINT_EVERY_N_FILES: u64 = 1000;
/// Memory threshold (see [`crate::resource_monitor`]) past which a scan
/// requests a collection hint while walking.
const GC_HINT_MEMORY_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("scan cancelled")]
    Cancelled,
    #[error("store error: {0}")]
    Store(#[from] fman_storage::StoreError),
}

/// Called after every entry the walker decides to process (file or
/// skipped directory), so the worker can publish progress snapshots.
pub trait ProgressSink {
    fn report(&mut self, progress: ScanProgress);
}

impl<F: FnMut(ScanProgress)> ProgressSink for F {
    fn report(&mut self, progress: ScanProgress) {
        self(progress)
    }
}

/// Walk `root` depth-first in lexicographic child order, hashing
/// eligible regular files and upserting a [`FileRecord`] for each into
/// `store`. Returns accumulated statistics, or [`WalkError::Cancelled`]
/// if `token` fires before the walk completes.
pub async fn scan(
    token: &CancellationToken,
    root: &Path,
    options: &ScanOptions,
    store: &dyn MetadataStore,
    mut progress: impl ProgressSink,
) -> Result<ScanStatistics, WalkError> {
    store.init()?;
    let mut stats = ScanStatistics::default();
    let mut files_seen: u64 = 0;
    let mut stack = vec![(root.to_path_buf(), 0usize)];

    while let Some((path, depth)) = stack.pop() {
        if token.is_cancelled() {
            return Err(WalkError::Cancelled);
        }

        let metadata = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if traversal_filter::is_permission_error(&e) => {
                stats.permission_errors += 1;
                stats.record_skip(options.verbose, path);
                continue;
            }
            Err(_) => continue,
        };

        if metadata.is_dir() {
            if depth > 0 && traversal_filter::should_skip(&path, depth) {
                stats.directories_skipped += 1;
                continue;
            }
            let mut children = match read_dir_sorted(&path) {
                Ok(children) => children,
                Err(e) if traversal_filter::is_permission_error(&e) => {
                    stats.permission_errors += 1;
                    stats.record_skip(options.verbose, path);
                    continue;
                }
                Err(_) => continue,
            };
            // Reverse so popping the stack still visits children in
            // lexicographic order.
            children.reverse();
            for child in children {
                stack.push((child, depth + 1));
            }
            continue;
        }

        if !metadata.is_file() {
            continue;
        }

        files_seen += 1;
        progress.report(ScanProgress {
            files_processed: files_seen,
            current_path: Some(path.clone()),
        });

        if files_seen % THROTTLE_EVERY_N_FILES == 0 && !options.throttle_delay.is_zero() {
            if !sleep_cancellable(options.throttle_delay, token).await {
                return Err(WalkError::Cancelled);
            }
        }
        if files_seen % GC_HINT_EVERY_N_FILES == 0 {
            maybe_hint_collection(GC_HINT_MEMORY_BYTES);
        }

        let size = metadata.len();
        let hash = if options.max_hash_file_size > 0 && size > options.max_hash_file_size {
            SENTINEL_HASH.to_string()
        } else {
            match hash_file(&path, token).await {
                Ok(Some(hash)) => hash,
                Ok(None) => return Err(WalkError::Cancelled),
                Err(e) if traversal_filter::is_permission_error(&e) => {
                    stats.permission_errors += 1;
                    stats.record_skip(options.verbose, path.clone());
                    continue;
                }
                Err(_) => continue,
            }
        };

        let modified_at_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let indexed_at_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let record = FileRecord {
            path: path.clone(),
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            size_bytes: size,
            modified_at_ms,
            content_hash: hash,
            indexed_at_ms,
        };
        store.upsert(&record)?;
        stats.files_indexed += 1;
    }

    Ok(stats)
}

fn read_dir_sorted(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> =
        std::fs::read_dir(path)?.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    entries.sort();
    Ok(entries)
}

/// Streams `path` through a 32 KiB buffer into a SHA-256 state,
/// checking `token` between chunks. `Ok(None)` signals cancellation
/// rather than an error, since cancellation isn't a file failure.
async fn hash_file(path: &Path, token: &CancellationToken) -> std::io::Result<Option<String>> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_BYTES];
    loop {
        if token.is_cancelled() {
            return Ok(None);
        }
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        tokio::task::yield_now().await;
    }
    Ok(Some(format!("{:x}", hasher.finalize())))
}

/// Sleep for `delay`, checking `token` cooperatively. Returns `false`
/// if cancelled before the delay elapsed.
async fn sleep_cancellable(delay: std::time::Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = token.cancelled() => false,
    }
}

fn maybe_hint_collection(_threshold_bytes: u64) {
    // No-op: see `resource_monitor::request_collection_hint` for why.
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
