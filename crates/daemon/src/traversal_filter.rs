// SPDX-License-Identifier: MIT

//! Platform-aware skip list for directories the walker shouldn't descend
//! into, and permission-error classification.

use std::path::Path;

/// Basenames and path substrings to skip, independent of platform.
const COMMON_PATTERNS: &[&str] = &[".Trash", "lost+found", "Thumbs.db", "desktop.ini"];

/// macOS-specific system/cache directories.
const MACOS_PATTERNS: &[&str] =
    &[".Spotlight-V100", ".fseventsd", ".DocumentRevisions-V100", ".TemporaryItems"];

/// Windows-specific system/cache directories and hibernation/swap files.
const WINDOWS_PATTERNS: &[&str] =
    &["$RECYCLE.BIN", "System Volume Information", "hiberfil.sys", "pagefile.sys", "swapfile.sys"];

/// Linux pseudo-filesystems and swap images.
const LINUX_PATTERNS: &[&str] = &["/proc", "/sys", "/dev", "swapfile"];

/// Depth (in path separators from the scan root) within which a
/// dotfile/dotdir is considered a shallow, skippable config directory.
const SHALLOW_DOTFILE_DEPTH: usize = 3;

/// Returns the platform-specific set of skip patterns.
pub fn skip_patterns() -> Vec<&'static str> {
    let mut patterns = COMMON_PATTERNS.to_vec();
    if cfg!(target_os = "macos") {
        patterns.extend_from_slice(MACOS_PATTERNS);
    }
    if cfg!(target_os = "windows") {
        patterns.extend_from_slice(WINDOWS_PATTERNS);
    }
    if cfg!(target_os = "linux") {
        patterns.extend_from_slice(LINUX_PATTERNS);
    }
    patterns
}

/// True if `path`, at `depth` separators from the scan root, should be
/// skipped: its basename exactly matches a pattern, the path contains a
/// pattern as a substring, or its basename is a dotfile within
/// [`SHALLOW_DOTFILE_DEPTH`] of the root.
pub fn should_skip(path: &Path, depth: usize) -> bool {
    let path_str = path.to_string_lossy();
    let basename = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

    let patterns = skip_patterns();
    if patterns.iter().any(|p| basename == *p) {
        return true;
    }
    if patterns.iter().any(|p| path_str.contains(p)) {
        return true;
    }
    if basename.starts_with('.') && depth <= SHALLOW_DOTFILE_DEPTH {
        return true;
    }
    false
}

/// Substrings that indicate a permission failure when an error's kind
/// isn't already [`std::io::ErrorKind::PermissionDenied`].
const PERMISSION_MESSAGE_SUBSTRINGS: &[&str] =
    &["permission denied", "operation not permitted", "access is denied"];

/// Classifies `err` as a permission error: its `ErrorKind` is
/// `PermissionDenied`, or its message matches a known substring
/// (case-insensitive), covering EACCES/EPERM surfaced via message text
/// on platforms that don't map them to `PermissionDenied`.
pub fn is_permission_error(err: &std::io::Error) -> bool {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        return true;
    }
    let message = err.to_string().to_lowercase();
    PERMISSION_MESSAGE_SUBSTRINGS.iter().any(|needle| message.contains(needle))
}

#[cfg(test)]
#[path = "traversal_filter_tests.rs"]
mod tests;
