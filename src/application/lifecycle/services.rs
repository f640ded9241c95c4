//! Collaborators shared by every runnable application

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::policies::{ReloadPolicy, RetryPolicy};
use crate::domain::ports::{ChangeWatcher, SandboxLauncher};

/// Receives source paths reported by an application's watcher.
pub type ChangeSink = Arc<dyn Fn(PathBuf) + Send + Sync>;

/// Launcher, watcher and policies used by [`RunnableApplication`](super::RunnableApplication).
#[derive(Clone)]
pub struct LifecycleServices {
    pub launcher: Arc<dyn SandboxLauncher>,
    pub watcher: Arc<dyn ChangeWatcher>,
    pub reload: ReloadPolicy,
    pub retry: RetryPolicy,
    /// Extensions transformed on start, primary configuration extension first.
    pub transform_extensions: Vec<String>,
}

impl LifecycleServices {
    pub fn new(launcher: Arc<dyn SandboxLauncher>, watcher: Arc<dyn ChangeWatcher>) -> Self {
        Self {
            launcher,
            watcher,
            reload: ReloadPolicy::default(),
            retry: RetryPolicy::default(),
            transform_extensions: vec![".config".to_string(), ".xml".to_string()],
        }
    }

    pub fn with_reload(mut self, reload: ReloadPolicy) -> Self {
        self.reload = reload;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_transform_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transform_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Extension of the per-application configuration file.
    pub fn config_extension(&self) -> &str {
        self.transform_extensions
            .first()
            .map_or(".config", String::as_str)
    }
}
