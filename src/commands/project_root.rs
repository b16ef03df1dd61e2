use std::path::{Path, PathBuf};

use stackplan::config::CONFIG_FILE_NAME;
use stackplan::presentation::cli::DEFAULT_STATE_DIR;

/// Discover the project root directory from an invocation directory.
///
/// Heuristics (first match wins, walking upward from `start`):
/// - `stackplan.toml` (project configuration)
/// - `.stackplan/` (anchors to existing deployment state)
/// - `.git/` or `.git` file (git repo root / worktree)
///
/// Falls back to `start` when no markers are found.
pub(crate) fn discover_project_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if dir.join(CONFIG_FILE_NAME).is_file() {
            return dir.to_path_buf();
        }
        if dir.join(DEFAULT_STATE_DIR).is_dir() {
            return dir.to_path_buf();
        }
        if dir.join(".git").exists() {
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}
