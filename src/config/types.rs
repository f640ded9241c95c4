//! Tool settings type definitions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::policies::{ReloadPolicy, RetryPolicy, DEFAULT_RELOAD_EXTENSIONS};
use crate::error::StagehandResult;
use crate::infrastructure::fs::stagehand_home_dir;

use super::loader::{self, ConfigWarning};

/// Where supervisor state lives.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeSettings {
    /// Runtime root; `<home>/.stagehand` when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Directory holding one sub-directory of files per host.
    #[serde(default)]
    pub hosts_dir: Option<PathBuf>,
}

/// Bootstrapper process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxSettings {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    #[serde(default = "default_exit_grace_secs")]
    pub exit_grace_secs: u64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            call_timeout_secs: default_call_timeout_secs(),
            exit_grace_secs: default_exit_grace_secs(),
        }
    }
}

fn default_program() -> String {
    "bootstrap".to_string()
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_exit_grace_secs() -> u64 {
    5
}

/// Live sync retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    10
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Extensions whose change recycles the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadSettings {
    #[serde(default = "default_reload_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            extensions: default_reload_extensions(),
        }
    }
}

fn default_reload_extensions() -> Vec<String> {
    DEFAULT_RELOAD_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Extensions the configuration transformer runs over, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSettings {
    #[serde(default = "default_config_extension")]
    pub config_extension: String,

    #[serde(default = "default_markup_extension")]
    pub markup_extension: String,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            config_extension: default_config_extension(),
            markup_extension: default_markup_extension(),
        }
    }
}

fn default_config_extension() -> String {
    ".config".to_string()
}

fn default_markup_extension() -> String {
    ".xml".to_string()
}

/// A host adapter described by file patterns.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HostDefinition {
    /// Source directory; `<hosts dir>/<name>` when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Globs (relative to the directory) of files to copy.
    #[serde(default)]
    pub include: Vec<String>,

    /// Files that must exist and are always copied.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Host adapter settings.
///
/// ```toml
/// [hosts]
/// strict = true
///
/// [hosts.katana]
/// include = ["*Owin*.dll"]
/// files = ["Microsoft.Owin.Host.HttpListener.dll"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HostsSettings {
    /// Reject host names with neither a definition nor a host directory.
    #[serde(default)]
    pub strict: bool,

    #[serde(flatten)]
    pub definitions: BTreeMap<String, HostDefinition>,
}

/// Stagehand tool settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub runtime: RuntimeSettings,

    #[serde(default)]
    pub sandbox: SandboxSettings,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub reload: ReloadSettings,

    #[serde(default)]
    pub transform: TransformSettings,

    #[serde(default)]
    pub hosts: HostsSettings,
}

impl Settings {
    /// Load settings from a TOML file and collect unknown-key warnings.
    pub fn load_with_warnings(path: &Path) -> StagehandResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit path, the user config file, or defaults, then
    /// apply `STAGEHAND_*` environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> StagehandResult<(Self, Vec<ConfigWarning>)> {
        loader::resolve(explicit)
    }

    /// Runtime root directory.
    pub fn root(&self) -> PathBuf {
        self.runtime.root.clone().unwrap_or_else(|| {
            stagehand_home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".stagehand")
        })
    }

    /// Parent of every staging directory.
    pub fn applications_root(&self) -> PathBuf {
        self.root().join("Applications")
    }

    pub fn hosts_root(&self) -> PathBuf {
        self.runtime
            .hosts_dir
            .clone()
            .unwrap_or_else(|| self.root().join("Hosts"))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.sync.retry_attempts,
            Duration::from_millis(self.sync.retry_delay_ms),
        )
    }

    pub fn reload_policy(&self) -> ReloadPolicy {
        ReloadPolicy::new(&self.reload.extensions)
    }

    /// Transform extensions in application order.
    pub fn transform_extensions(&self) -> [&str; 2] {
        [
            self.transform.config_extension.as_str(),
            self.transform.markup_extension.as_str(),
        ]
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox.call_timeout_secs)
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_secs(self.sandbox.exit_grace_secs)
    }
}
