//! Atomic file replacement.
//!
//! Writes go to a temp file in the destination directory and are renamed over
//! the target, so a reader never observes a half-written history record. Where
//! rename-over-existing fails (Windows), the old file is moved to `.bak` first
//! and restored if the second rename fails.
//!
//! On Unix a replaced file keeps its existing mode. A new file gets the mode a
//! plain `open(O_CREAT, 0o666)` would give it, i.e. whatever the umask allows.

use std::fs;
#[cfg(unix)]
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSyncPolicy {
    SyncAll,
    SkipSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentDirSyncPolicy {
    SyncBestEffort,
    SkipSync,
}

#[derive(Debug, Clone, Copy)]
pub struct AtomicWriteOptions {
    pub file_sync: FileSyncPolicy,
    pub parent_dir_sync: ParentDirSyncPolicy,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            file_sync: FileSyncPolicy::SyncAll,
            parent_dir_sync: ParentDirSyncPolicy::SyncBestEffort,
        }
    }
}

/// Restore `path` from `path.bak` left behind by an interrupted replace.
///
/// Returns `true` if a backup was restored.
pub fn recover_bak_file(path: &Path) -> bool {
    let backup = path.with_extension("bak");
    if path.exists() || !backup.exists() {
        return false;
    }
    match fs::rename(&backup, path) {
        Ok(()) => {
            tracing::warn!(
                path = %path.display(),
                "Recovered .bak file from interrupted atomic write"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                "Failed to recover .bak file: {e}"
            );
            false
        }
    }
}

pub fn atomic_write_with_options(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: AtomicWriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = parent_or_cwd(path);

    let mut tmp = create_temp(path, parent)?;

    tmp.write_all(bytes)?;
    if matches!(options.file_sync, FileSyncPolicy::SyncAll) {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup_path = path.with_extension("bak");
        let _ = fs::remove_file(&backup_path);
        fs::rename(path, &backup_path)?;

        if let Err(rename_err) = err.file.persist(path) {
            let _ = fs::rename(&backup_path, path);
            return Err(rename_err.error);
        }
        if let Err(e) = fs::remove_file(&backup_path) {
            tracing::warn!(
                path = %backup_path.display(),
                "Failed to remove .bak after atomic write: {e}"
            );
        }
    }

    if matches!(options.parent_dir_sync, ParentDirSyncPolicy::SyncBestEffort) {
        best_effort_sync_parent_dir(parent);
    }

    Ok(())
}

#[cfg(unix)]
fn create_temp(path: &Path, parent: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(existing) => {
            let tmp = NamedTempFile::new_in(parent)?;
            fs::set_permissions(tmp.path(), existing.permissions())?;
            Ok(tmp)
        }
        // open(2) masks the requested mode with the process umask.
        Err(e) if e.kind() == io::ErrorKind::NotFound => tempfile::Builder::new()
            .permissions(fs::Permissions::from_mode(NEW_FILE_MODE))
            .tempfile_in(parent),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn create_temp(_path: &Path, parent: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(parent)
}

fn parent_or_cwd(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn best_effort_sync_parent_dir(parent: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(parent).and_then(|d| d.sync_all()) {
        debug!(path = %parent.display(), "Parent directory sync_all failed (best-effort): {e}");
    }

    #[cfg(not(unix))]
    debug!(path = %parent.display(), "Parent directory sync skipped on this platform");
}
