//! Atomic, owner-only file writes and the settings directory lock.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::error::SettingsError;

const LOCK_FILENAME: &str = ".lock";

/// Write `contents` to `path` through a temp file in the same directory.
///
/// The temp file gets mode 0600 before it is renamed over `path`, so
/// readers see either the old file or the complete new one. On failure
/// the previous file is left untouched.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<(), SettingsError> {
    let write_err = |source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600)).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Exclusive advisory lock on the settings directory.
///
/// Serializes writers across processes; released on drop.
pub struct SettingsLock {
    file: File,
    path: PathBuf,
}

impl SettingsLock {
    /// Block until the lock on `dir` is held.
    pub fn acquire(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(LOCK_FILENAME);
        let lock_err = |source| SettingsError::Lock {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(|source| SettingsError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;

        tracing::trace!("Acquired {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for SettingsLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release {}: {}", self.path.display(), e);
        }
    }
}
