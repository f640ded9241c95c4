//! Host that copies a whole host directory into the staging directory.

use std::path::{Path, PathBuf};

use crate::domain::ports::HostAdapter;
use crate::error::StagehandResult;

/// Copies every file of `<hosts dir>/<name>` (recursively) into the staging
/// directory. A missing host directory makes `prepare` a no-op.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    name: String,
    directory: PathBuf,
}

impl DirectoryHost {
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl HostAdapter for DirectoryHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, destination: &Path) -> StagehandResult<()> {
        if !self.directory.is_dir() {
            tracing::debug!(host = %self.name, directory = %self.directory.display(), "no host files");
            return Ok(());
        }
        let copied = copy_tree(&self.directory, destination)?;
        tracing::debug!(host = %self.name, files = copied, "host files copied");
        Ok(())
    }
}

fn copy_tree(from: &Path, to: &Path) -> StagehandResult<usize> {
    std::fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
