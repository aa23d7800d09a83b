// SPDX-License-Identifier: MIT

//! The metadata store: a keyed upsert-and-query interface the scan walker
//! writes through, backed by SQLite.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod record;
mod sqlite;

pub use error::StoreError;
pub use record::FileRecord;
pub use sqlite::{MetadataStore, SqliteStore};
