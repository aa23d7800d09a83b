// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn normalize_collapses_dot_and_dotdot_without_touching_disk() {
    let normalizer = PathNormalizer::new();
    let raw = PathBuf::from("/tmp/a/../a/./b");
    let canonical = normalizer.normalize(&raw).unwrap();
    assert!(canonical.to_string_lossy().ends_with("/a/b") || canonical.ends_with("b"));
}

#[test]
fn normalize_is_memoized() {
    let normalizer = PathNormalizer::new();
    let raw = PathBuf::from("/tmp/memo-test");
    let first = normalizer.normalize(&raw).unwrap();
    let second = normalizer.normalize(&raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(normalizer.cache.read().len(), 1);
}

#[test]
fn is_parent_true_for_strict_descendant() {
    let normalizer = PathNormalizer::new();
    let parent = PathBuf::from("/tmp/docs");
    let child = PathBuf::from("/tmp/docs/reports");
    assert!(normalizer.is_parent(&parent, &child).unwrap());
}

#[test]
fn is_parent_false_for_identical_paths() {
    let normalizer = PathNormalizer::new();
    let path = PathBuf::from("/tmp/docs");
    assert!(!normalizer.is_parent(&path, &path).unwrap());
}

#[test]
fn has_conflict_detects_duplicate() {
    let normalizer = PathNormalizer::new();
    let existing = vec![PathBuf::from("/tmp/docs")];
    assert_eq!(normalizer.has_conflict(Path::new("/tmp/docs"), &existing), Some(Conflict::Duplicate));
}

#[test]
fn has_conflict_detects_parent_child() {
    let normalizer = PathNormalizer::new();
    let existing = vec![PathBuf::from("/tmp/docs/reports")];
    assert_eq!(
        normalizer.has_conflict(Path::new("/tmp/docs"), &existing),
        Some(Conflict::ParentChild)
    );
}

#[test]
fn has_conflict_detects_child_parent() {
    let normalizer = PathNormalizer::new();
    let existing = vec![PathBuf::from("/tmp/docs")];
    assert_eq!(
        normalizer.has_conflict(Path::new("/tmp/docs/reports"), &existing),
        Some(Conflict::ChildParent)
    );
}

#[test]
fn has_conflict_none_for_unrelated_paths() {
    let normalizer = PathNormalizer::new();
    let existing = vec![PathBuf::from("/tmp/docs")];
    assert_eq!(normalizer.has_conflict(Path::new("/tmp/photos"), &existing), None);
}

#[test]
fn optimize_is_idempotent() {
    let normalizer = PathNormalizer::new();
    let input = vec![
        PathBuf::from("/tmp/a"),
        PathBuf::from("/tmp/a/b"),
        PathBuf::from("/tmp/c"),
    ];
    let once = normalizer.optimize(&input);
    let twice = normalizer.optimize(&once.kept);
    assert_eq!(once.kept, twice.kept);
}

#[test]
fn optimize_drops_children_of_kept_ancestors() {
    let normalizer = PathNormalizer::new();
    let input = vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/a/b/c")];
    let result = normalizer.optimize(&input);
    assert_eq!(result.kept, vec![PathBuf::from("/tmp/a")]);
    assert_eq!(result.removed, vec![PathBuf::from("/tmp/a/b/c")]);
}

#[test]
fn optimize_kept_is_subset_preserving_first_seen_order() {
    let normalizer = PathNormalizer::new();
    let input = vec![PathBuf::from("/tmp/z"), PathBuf::from("/tmp/a"), PathBuf::from("/tmp/m")];
    let result = normalizer.optimize(&input);
    assert_eq!(result.kept, input);
}

#[test]
fn optimize_deduplicates_identical_paths() {
    let normalizer = PathNormalizer::new();
    let input = vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/a")];
    let result = normalizer.optimize(&input);
    assert_eq!(result.kept, vec![PathBuf::from("/tmp/a")]);
    assert_eq!(result.removed, vec![PathBuf::from("/tmp/a")]);
}

#[test]
fn no_two_kept_paths_share_a_parent_child_relation() {
    let normalizer = PathNormalizer::new();
    let input = vec![
        PathBuf::from("/tmp/a"),
        PathBuf::from("/tmp/a/b"),
        PathBuf::from("/tmp/x/y"),
        PathBuf::from("/tmp/x"),
    ];
    let result = normalizer.optimize(&input);
    for i in 0..result.kept.len() {
        for j in 0..result.kept.len() {
            if i != j {
                assert!(!is_strict_prefix(&result.kept[i], &result.kept[j]));
            }
        }
    }
}
