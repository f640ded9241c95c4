//! Change Watcher port
//!
//! Recursively observes a directory and reports every created, changed,
//! deleted or renamed path. No debouncing happens at this level.

use std::path::{Path, PathBuf};

use crate::error::StagehandResult;

/// Callback receiving the full path of each changed entry.
pub type ChangeCallback = Box<dyn Fn(PathBuf) + Send + 'static>;

/// Filter matching every file.
pub const MATCH_ALL: &str = "*";

/// A registered watch. Dropping or stopping it ends delivery.
pub trait WatchHandle: Send {
    /// Dispose the underlying watch and drop the callback.
    fn stop(&mut self);
}

/// Registers recursive watches.
pub trait ChangeWatcher: Send + Sync {
    /// Watch `root` recursively; `filter` is a glob on the file name.
    fn watch(
        &self,
        root: &Path,
        filter: &str,
        on_change: ChangeCallback,
    ) -> StagehandResult<Box<dyn WatchHandle>>;
}
