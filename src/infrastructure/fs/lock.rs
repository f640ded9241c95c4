//! Cross-process application locks
//!
//! A supervisor holds an exclusive advisory lock on
//! `<Applications>/<name>.lock` for as long as it owns that application's
//! staging directory.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{StagehandError, StagehandResult};

/// An exclusive lock, released on drop.
#[derive(Debug)]
pub struct ApplicationLock {
    file: File,
    path: PathBuf,
}

impl ApplicationLock {
    /// Take the lock for `name` under `applications_root`, failing fast if
    /// another process holds it.
    pub fn acquire(applications_root: &Path, name: &str) -> StagehandResult<Self> {
        std::fs::create_dir_all(applications_root)?;
        let path = applications_root.join(format!("{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StagehandError::ApplicationLocked {
                name: name.to_string(),
                lock: path,
            });
        }

        tracing::debug!(application = name, lock = %path.display(), "lock acquired");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ApplicationLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
