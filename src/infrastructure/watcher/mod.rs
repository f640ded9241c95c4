//! Change watcher backed by `notify`.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::domain::ports::{ChangeCallback, ChangeWatcher, WatchHandle, MATCH_ALL};
use crate::error::{StagehandError, StagehandResult};

/// Registers recursive `notify` watches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcher;

impl NotifyWatcher {
    pub fn new() -> Self {
        Self
    }
}

impl ChangeWatcher for NotifyWatcher {
    fn watch(
        &self,
        root: &Path,
        filter: &str,
        on_change: ChangeCallback,
    ) -> StagehandResult<Box<dyn WatchHandle>> {
        let watch_error = |message: String| StagehandError::Watch {
            path: root.to_path_buf(),
            message,
        };

        let matcher: Option<GlobMatcher> = match filter.trim() {
            "" | MATCH_ALL => None,
            glob => Some(
                Glob::new(glob)
                    .map_err(|e| watch_error(e.to_string()))?
                    .compile_matcher(),
            ),
        };

        let display_root = root.display().to_string();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    for path in event.paths {
                        if passes(matcher.as_ref(), &path) {
                            on_change(path);
                        }
                    }
                }
                Err(e) => tracing::warn!(root = %display_root, error = %e, "watch error"),
            },
            Config::default(),
        )
        .map_err(|e| watch_error(e.to_string()))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| watch_error(e.to_string()))?;

        tracing::debug!(root = %root.display(), filter, "watching");
        Ok(Box::new(NotifyWatch {
            watcher: Some(watcher),
            root: root.to_path_buf(),
        }))
    }
}

fn passes(matcher: Option<&GlobMatcher>, path: &Path) -> bool {
    match matcher {
        None => true,
        Some(m) => path.file_name().is_some_and(|name| m.is_match(name)),
    }
}

/// An active `notify` watch.
pub struct NotifyWatch {
    watcher: Option<RecommendedWatcher>,
    root: PathBuf,
}

impl WatchHandle for NotifyWatch {
    fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::debug!(root = %self.root.display(), "watch stopped");
        }
    }
}
