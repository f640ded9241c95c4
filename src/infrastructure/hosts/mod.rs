//! Host adapters and the registry that resolves them by name.

mod directory;
mod pattern;

use std::path::PathBuf;
use std::sync::Arc;

pub use directory::DirectoryHost;
pub use pattern::PatternHost;

use crate::config::HostsSettings;
use crate::domain::ports::HostAdapter;
use crate::error::{StagehandError, StagehandResult};

/// Resolves host names to adapters.
///
/// A name with a `[hosts.<name>]` definition becomes a [`PatternHost`];
/// any other name becomes a [`DirectoryHost`] over `<hosts dir>/<name>`.
/// In strict mode a name with neither is an [`StagehandError::UnknownHost`].
#[derive(Debug, Clone)]
pub struct HostRegistry {
    hosts_dir: PathBuf,
    settings: HostsSettings,
}

impl HostRegistry {
    pub fn new(hosts_dir: impl Into<PathBuf>, settings: HostsSettings) -> Self {
        Self {
            hosts_dir: hosts_dir.into(),
            settings,
        }
    }

    pub fn resolve(&self, name: &str) -> StagehandResult<Arc<dyn HostAdapter>> {
        let default_dir = self.hosts_dir.join(name);

        if let Some(definition) = self.settings.definitions.get(name) {
            let directory = definition.directory.clone().unwrap_or(default_dir);
            let host = PatternHost::new(
                name,
                directory,
                &definition.include,
                definition.files.clone(),
            )?;
            return Ok(Arc::new(host));
        }

        if self.settings.strict && !default_dir.is_dir() {
            return Err(StagehandError::UnknownHost {
                name: name.to_string(),
            });
        }

        Ok(Arc::new(DirectoryHost::new(name, default_dir)))
    }

    /// Resolve every name, keeping order.
    pub fn resolve_all<'a, I>(&self, names: I) -> StagehandResult<Vec<Arc<dyn HostAdapter>>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().map(|n| self.resolve(n)).collect()
    }
}
