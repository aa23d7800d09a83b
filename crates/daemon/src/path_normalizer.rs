// SPDX-License-Identifier: MIT

//! Path normalization, parent/child relations, and conflict detection.
//!
//! Canonical form: absolute, symlinks resolved (falling back to the
//! parent's resolved form if the final component doesn't exist),
//! forward separators, lowercased on case-insensitive platforms,
//! trailing separators trimmed. Results are memoized.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fman_core::Conflict;
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("failed to resolve current directory for relative path {0}")]
    NoCurrentDir(String),
}

/// Paths are considered case-insensitive on these platforms.
fn is_case_insensitive() -> bool {
    cfg!(any(target_os = "macos", target_os = "windows"))
}

/// Outcome of [`PathNormalizer::optimize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeResult {
    pub kept: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub conflicts: Vec<(PathBuf, Conflict)>,
}

/// Canonicalizes paths and detects duplicate/ancestor relations among
/// them, memoizing raw-input → canonical-form lookups behind a
/// reader/writer lock.
#[derive(Default)]
pub struct PathNormalizer {
    cache: RwLock<HashMap<PathBuf, PathBuf>>,
}

impl PathNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `input` into canonical form, memoizing the result.
    pub fn normalize(&self, input: &Path) -> Result<PathBuf, NormalizeError> {
        if let Some(hit) = self.cache.read().get(input) {
            return Ok(hit.clone());
        }
        let canonical = compute_canonical(input)?;
        self.cache.write().insert(input.to_path_buf(), canonical.clone());
        Ok(canonical)
    }

    /// True iff `canonical(b)` has `canonical(a)` + separator as a strict
    /// prefix. Identical paths are not parents of themselves.
    pub fn is_parent(&self, a: &Path, b: &Path) -> Result<bool, NormalizeError> {
        let ca = self.normalize(a)?;
        let cb = self.normalize(b)?;
        Ok(is_strict_prefix(&ca, &cb))
    }

    /// First conflict found between `new` and any of `existing`, checked
    /// in order: duplicate, parent_child, child_parent.
    pub fn has_conflict(&self, new: &Path, existing: &[PathBuf]) -> Option<Conflict> {
        let new_canonical = match self.normalize(new) {
            Ok(p) => p,
            Err(_) => return Some(Conflict::Invalid),
        };
        let mut found = None;
        for other in existing {
            let other_canonical = match self.normalize(other) {
                Ok(p) => p,
                Err(_) => return Some(Conflict::Invalid),
            };
            let relation = if new_canonical == other_canonical {
                Some(Conflict::Duplicate)
            } else if is_strict_prefix(&new_canonical, &other_canonical) {
                Some(Conflict::ParentChild)
            } else if is_strict_prefix(&other_canonical, &new_canonical) {
                Some(Conflict::ChildParent)
            } else {
                None
            };
            match relation {
                Some(Conflict::Duplicate) => return Some(Conflict::Duplicate),
                Some(c) if found.is_none() => found = Some(c),
                _ => {}
            }
        }
        found
    }

    /// Deduplicate `paths` after normalization, then drop any path whose
    /// canonical form is strictly contained within another surviving
    /// path. Kept order is first-seen order among survivors.
    pub fn optimize(&self, paths: &[PathBuf]) -> OptimizeResult {
        let mut seen = Vec::new();
        let mut removed = Vec::new();
        let mut conflicts = Vec::new();

        for path in paths {
            let canonical = match self.normalize(path) {
                Ok(p) => p,
                Err(_) => {
                    removed.push(path.clone());
                    conflicts.push((path.clone(), Conflict::Invalid));
                    continue;
                }
            };
            if seen.iter().any(|(c, _): &(PathBuf, PathBuf)| *c == canonical) {
                removed.push(path.clone());
                conflicts.push((path.clone(), Conflict::Duplicate));
                continue;
            }
            seen.push((canonical, path.clone()));
        }

        let mut kept_indices: Vec<usize> = (0..seen.len()).collect();
        kept_indices.retain(|&i| {
            let (canonical_i, original_i) = &seen[i];
            let contained_in_another = seen.iter().enumerate().any(|(j, (canonical_j, _))| {
                i != j && is_strict_prefix(canonical_j, canonical_i)
            });
            if contained_in_another {
                removed.push(original_i.clone());
                conflicts.push((original_i.clone(), Conflict::ChildParent));
            }
            !contained_in_another
        });

        let kept = kept_indices.into_iter().map(|i| seen[i].1.clone()).collect();
        OptimizeResult { kept, removed, conflicts }
    }
}

fn is_strict_prefix(ancestor: &Path, descendant: &Path) -> bool {
    if ancestor == descendant {
        return false;
    }
    let ancestor_str = ancestor.to_string_lossy();
    let descendant_str = descendant.to_string_lossy();
    let prefix = if ancestor_str.ends_with('/') {
        ancestor_str.to_string()
    } else {
        format!("{ancestor_str}/")
    };
    descendant_str.starts_with(&prefix)
}

fn compute_canonical(input: &Path) -> Result<PathBuf, NormalizeError> {
    let absolute = if input.is_absolute() {
        input.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|_| NormalizeError::NoCurrentDir(input.display().to_string()))?;
        cwd.join(input)
    };

    let cleaned = clean(&absolute);

    let resolved = match std::fs::canonicalize(&cleaned) {
        Ok(p) => p,
        Err(_) => match cleaned.parent() {
            Some(parent) => {
                let parent_resolved =
                    std::fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
                match cleaned.file_name() {
                    Some(name) => parent_resolved.join(name),
                    None => parent_resolved,
                }
            }
            None => cleaned.clone(),
        },
    };

    let mut s = resolved.to_string_lossy().replace('\\', "/");
    if is_case_insensitive() {
        s = s.to_lowercase();
    }
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    Ok(PathBuf::from(s))
}

/// Collapse `.` and `..` components without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "path_normalizer_tests.rs"]
mod tests;
