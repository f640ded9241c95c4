//! Configuration module for Stagehand
//!
//! Two documents feed a run:
//! 1. Tool settings (`--settings`, else `<config dir>/stagehand/config.toml`,
//!    else built-in defaults), with `STAGEHAND_*` environment overrides
//!    applied last
//! 2. An optional run configuration document (JSON) describing the
//!    applications, merged with the command-line flags

mod loader;
mod run_configuration;
mod types;

pub use loader::{user_settings_path, with_env_overrides, ConfigWarning};
pub use run_configuration::{
    application_specs, HostEntry, InlineOptions, RunConfiguration, RunEntry,
};
pub use types::{
    HostDefinition, HostsSettings, ReloadSettings, RuntimeSettings, SandboxSettings, Settings,
    SyncSettings, TransformSettings,
};
