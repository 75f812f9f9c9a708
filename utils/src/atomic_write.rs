//! Whole-file replacement for result files.
//!
//! Bytes go to a temp file beside the destination, which is then renamed over
//! it. Readers see the old file or the new one, never a truncated mix. Where
//! rename cannot replace an existing file (Windows), the old file is moved to
//! `<name>.bak` first and restored if the second rename fails too.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// How hard a write tries to reach the disk before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// fsync the data, then best-effort fsync the directory entry.
    #[default]
    Synced,
    /// Rename only. For tests and scratch files.
    Unsynced,
}

/// `data7.csv` -> `data7.csv.bak`, so sibling files with the same stem never
/// share a backup.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Put back a backup left by a crash between the two renames of a fallback
/// write. Does nothing when `path` exists or there is no backup.
pub fn recover_bak_file(path: &Path) {
    let backup = backup_path(path);
    if path.exists() || !backup.exists() {
        return;
    }
    match fs::rename(&backup, path) {
        Ok(()) => warn!(path = %path.display(), "Restored backup left by an interrupted write"),
        Err(e) => warn!(path = %path.display(), "Could not restore backup: {e}"),
    }
}

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with(path, bytes, Durability::default())
}

pub fn atomic_write_with(
    path: impl AsRef<Path>,
    bytes: &[u8],
    durability: Durability,
) -> io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    if durability == Durability::Synced {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup = backup_path(path);
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;

        if let Err(retry) = err.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(retry.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), "Could not remove backup after write: {e}");
        }
    }

    if durability == Durability::Synced {
        sync_dir(dir);
    }
    Ok(())
}

fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(path = %dir.display(), "Directory sync failed (best-effort): {e}");
    }

    #[cfg(not(unix))]
    debug!(path = %dir.display(), "Directory sync not supported here");
}
