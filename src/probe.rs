//! Filesystem existence checks used to decide between clone, skip and pull.

use std::path::Path;

/// Marker entry that identifies a git working copy
pub const GIT_MARKER: &str = ".git";

/// True if `path` exists and is a regular file
pub fn file_exists(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

/// True if `path` exists and is a directory
pub fn folder_exists(path: &Path) -> bool {
    path.metadata().map(|m| m.is_dir()).unwrap_or(false)
}

/// True if anything exists at `path`.
///
/// Errors other than "not found" (e.g. permission denied) count as existing,
/// so a path we cannot inspect is never cloned over.
pub fn path_exists(path: &Path) -> bool {
    match std::fs::symlink_metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}

/// True if `dir` contains a `.git` entry (directory or gitfile)
pub fn is_git_repo(dir: &Path) -> bool {
    dir.join(GIT_MARKER).exists()
}
