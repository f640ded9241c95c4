//! Host described by file globs and required files.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::domain::ports::HostAdapter;
use crate::error::{StagehandError, StagehandResult};

/// Copies the files of a host directory whose names match `include`, plus
/// every file named in `files`, which must exist.
#[derive(Debug, Clone)]
pub struct PatternHost {
    name: String,
    directory: PathBuf,
    include: GlobSet,
    files: Vec<String>,
}

impl PatternHost {
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        include: &[String],
        files: Vec<String>,
    ) -> StagehandResult<Self> {
        let name = name.into();
        let mut builder = GlobSetBuilder::new();
        for pattern in include {
            let glob = Glob::new(pattern).map_err(|e| StagehandError::InvalidSettings {
                file: PathBuf::from(format!("hosts.{name}.include")),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let include = builder.build().map_err(|e| StagehandError::InvalidSettings {
            file: PathBuf::from(format!("hosts.{name}.include")),
            message: e.to_string(),
        })?;
        Ok(Self {
            name,
            directory: directory.into(),
            include,
            files,
        })
    }
}

impl HostAdapter for PatternHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, destination: &Path) -> StagehandResult<()> {
        std::fs::create_dir_all(destination)?;
        let mut copied = 0usize;

        if !self.include.is_empty() && self.directory.is_dir() {
            for entry in std::fs::read_dir(&self.directory)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() || !self.include.is_match(entry.file_name()) {
                    continue;
                }
                std::fs::copy(entry.path(), destination.join(entry.file_name()))?;
                copied += 1;
            }
        }

        for file in &self.files {
            let source = self.directory.join(file);
            if !source.is_file() {
                return Err(StagehandError::HostFileMissing {
                    host: self.name.clone(),
                    file: source,
                });
            }
            std::fs::copy(&source, destination.join(file))?;
            copied += 1;
        }

        tracing::debug!(host = %self.name, files = copied, "host files copied");
        Ok(())
    }
}
