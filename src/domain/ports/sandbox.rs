//! Execution Sandbox port
//!
//! An execution sandbox is an isolated context that hosts the application's
//! bootstrapper. The supervisor only ever talks to the bootstrapper through
//! the [`Sandbox`] handle; unloading the sandbox must release every resource
//! it holds, including file locks on the staged binaries, so the staging
//! directory can be deleted and copied again.

use std::path::{Path, PathBuf};

use crate::domain::entities::HostArguments;
use crate::error::StagehandResult;

/// Parameters for creating a sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSetup {
    /// Application name, used for logging and as the config file stem.
    pub application: String,
    /// Private base directory of the sandbox (the staging directory).
    pub base_directory: PathBuf,
    /// Configuration file name, relative to `base_directory`.
    pub configuration_file: String,
    /// Environment the application boots in.
    pub environment: String,
    /// Bootstrapper program overriding the launcher's default.
    pub program: Option<String>,
}

impl SandboxSetup {
    pub fn configuration_path(&self) -> PathBuf {
        self.base_directory.join(&self.configuration_file)
    }
}

/// Proxy to a bootstrapper living inside an isolated context.
pub trait Sandbox: Send {
    /// Call `initialize(path)` on the bootstrapper.
    fn initialize(&mut self, staging_directory: &Path) -> StagehandResult<()>;

    /// Call `start(environment, hostArguments)` on the bootstrapper.
    fn start(&mut self, environment: &str, host_arguments: &HostArguments) -> StagehandResult<()>;

    /// Call `stop()` on the bootstrapper.
    fn stop(&mut self) -> StagehandResult<()>;

    /// Destroy the isolated context and release everything it holds.
    fn unload(self: Box<Self>) -> StagehandResult<()>;
}

/// Creates sandboxes.
pub trait SandboxLauncher: Send + Sync {
    fn launch(&self, setup: &SandboxSetup) -> StagehandResult<Box<dyn Sandbox>>;
}
