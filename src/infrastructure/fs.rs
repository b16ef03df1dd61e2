//! Local file helpers shared by the file-backed adapters

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use fs2::FileExt;

/// Write `content` to `path` atomically
///
/// Writes a temp file in the same directory and renames it over the target.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Run `f` while holding an exclusive lock on `lock_path`
pub fn with_exclusive_lock<T>(lock_path: &Path, f: impl FnOnce() -> T) -> io::Result<T> {
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let lock_file = fs::File::create(lock_path)?;
    lock_file.lock_exclusive()?;

    let result = f();

    let _ = lock_file.unlock();
    Ok(result)
}
