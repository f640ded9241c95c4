//! Deployment Stager
//!
//! Copies an application's build output into its staging directory, either
//! as a full mirror onto a wiped destination or one changed file at a time.

use std::io;
use std::path::{Path, PathBuf};

use crate::domain::policies::RetryPolicy;
use crate::domain::value_objects::IgnorePatterns;
use crate::error::{StagehandError, StagehandResult};

/// What a full mirror copied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub files: usize,
    pub directories: usize,
    pub skipped_directories: usize,
}

/// Result of syncing one changed source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The file was copied on the given attempt.
    Copied { destination: PathBuf, attempts: u32 },
    /// The source no longer exists; its staged copy was removed.
    Removed { destination: PathBuf },
    /// A new directory was mirrored.
    DirectoryMirrored { destination: PathBuf },
    /// The path lies under an ignored directory.
    Ignored,
    /// The path is not under the source root.
    OutsideSource,
    /// The copy failed; try again as `attempt` once the retry delay passed.
    Retry { attempt: u32, error: String },
    /// Every attempt failed; the staged copy may be stale.
    Failed { attempts: u32, error: String },
}

/// Stages one application's files.
#[derive(Debug, Clone)]
pub struct DeploymentStager {
    ignore: IgnorePatterns,
    retry: RetryPolicy,
}

impl DeploymentStager {
    pub fn new(ignore: IgnorePatterns, retry: RetryPolicy) -> Self {
        Self { ignore, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Delete `destination` if it exists.
    pub fn clear(destination: &Path) -> StagehandResult<()> {
        match std::fs::remove_dir_all(destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Recreate `destination` from `source`, skipping ignored directories.
    pub fn mirror(&self, source: &Path, destination: &Path) -> StagehandResult<MirrorStats> {
        if !source.is_dir() {
            return Err(StagehandError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        let mut stats = MirrorStats::default();
        self.mirror_dir(source, destination, Path::new(""), &mut stats)?;
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            files = stats.files,
            skipped = stats.skipped_directories,
            "mirrored"
        );
        Ok(stats)
    }

    fn mirror_dir(
        &self,
        source: &Path,
        destination: &Path,
        relative: &Path,
        stats: &mut MirrorStats,
    ) -> StagehandResult<()> {
        std::fs::create_dir_all(destination)?;
        stats.directories += 1;

        let mut entries: Vec<_> = std::fs::read_dir(source)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let from = entry.path();
            let to = destination.join(entry.file_name());
            if from.is_dir() {
                let child = relative.join(entry.file_name());
                if !self.ignore.should_copy(&child) {
                    tracing::debug!(directory = %child.display(), "skipping ignored directory");
                    stats.skipped_directories += 1;
                    continue;
                }
                self.mirror_dir(&from, &to, &child, stats)?;
            } else {
                std::fs::copy(&from, &to)?;
                stats.files += 1;
            }
        }
        Ok(())
    }

    /// Make attempt number `attempt` (1-based) at bringing the staged copy of
    /// `changed` up to date.
    pub fn sync_file(
        &self,
        source_root: &Path,
        destination_root: &Path,
        changed: &Path,
        attempt: u32,
    ) -> SyncOutcome {
        self.sync_file_with(source_root, destination_root, changed, attempt, |from, to| {
            std::fs::copy(from, to).map(|_| ())
        })
    }

    /// Like [`sync_file`](Self::sync_file) with a custom copy primitive.
    pub fn sync_file_with<C>(
        &self,
        source_root: &Path,
        destination_root: &Path,
        changed: &Path,
        attempt: u32,
        copy: C,
    ) -> SyncOutcome
    where
        C: FnOnce(&Path, &Path) -> io::Result<()>,
    {
        let Ok(relative) = changed.strip_prefix(source_root) else {
            return SyncOutcome::OutsideSource;
        };
        if relative.as_os_str().is_empty() {
            return SyncOutcome::OutsideSource;
        }
        if !self.passes_ignore(relative) {
            return SyncOutcome::Ignored;
        }

        let destination = destination_root.join(relative);

        if changed.is_dir() {
            if !self.ignore.should_copy(relative) {
                return SyncOutcome::Ignored;
            }
            let mut stats = MirrorStats::default();
            return match self.mirror_dir(changed, &destination, relative, &mut stats) {
                Ok(()) => SyncOutcome::DirectoryMirrored { destination },
                Err(e) => self.after_failure(attempt, e.to_string()),
            };
        }

        if !changed.exists() {
            let removed = if destination.is_dir() {
                std::fs::remove_dir_all(&destination)
            } else {
                std::fs::remove_file(&destination)
            };
            return match removed {
                Ok(()) => SyncOutcome::Removed { destination },
                Err(e) if e.kind() == io::ErrorKind::NotFound => SyncOutcome::Removed { destination },
                Err(e) => self.after_failure(attempt, e.to_string()),
            };
        }

        let copied = destination
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| copy(changed, &destination));

        match copied {
            Ok(()) => SyncOutcome::Copied {
                destination,
                attempts: attempt,
            },
            Err(e) => {
                tracing::debug!(path = %changed.display(), attempt, error = %e, "copy failed");
                self.after_failure(attempt, e.to_string())
            }
        }
    }

    fn after_failure(&self, attempt: u32, error: String) -> SyncOutcome {
        match self.retry.next_attempt(attempt) {
            Some(next) => SyncOutcome::Retry {
                attempt: next,
                error,
            },
            None => SyncOutcome::Failed {
                attempts: attempt,
                error,
            },
        }
    }

    /// Every directory between the source root and the file must pass.
    fn passes_ignore(&self, relative_file: &Path) -> bool {
        relative_file
            .ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .all(|dir| self.ignore.should_copy(dir))
    }
}
