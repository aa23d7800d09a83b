// SPDX-License-Identifier: MIT

//! Path-conflict classification shared by the Path Normalizer and the
//! server's admission policy.

use serde::{Deserialize, Serialize};

/// The relation between a newly submitted path and an existing one,
/// both already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conflict {
    /// The two normalized paths are identical.
    Duplicate,
    /// The new path contains the existing path (new is an ancestor).
    ParentChild,
    /// The existing path contains the new path (existing is an ancestor).
    ChildParent,
    /// One side failed to normalize.
    Invalid,
}

crate::simple_display! {
    Conflict {
        Duplicate => "duplicate",
        ParentChild => "parent_child",
        ChildParent => "child_parent",
        Invalid => "invalid",
    }
}
