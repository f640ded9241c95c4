//! Host Adapter port
//!
//! A host adapter injects the runtime files a particular host needs into an
//! already-staged application, and cleans up after it when the application
//! stops. Adapters are stateless and looked up by name.

use std::path::Path;

use crate::error::StagehandResult;

/// Prepares and tears down host-specific files in a staging directory.
///
/// `prepare` runs on every Start against a freshly mirrored directory, so it
/// must be idempotent.
pub trait HostAdapter: Send + Sync {
    /// Name the adapter is registered under.
    fn name(&self) -> &str;

    /// Copy or generate the host's files into `destination`.
    fn prepare(&self, destination: &Path) -> StagehandResult<()>;

    /// Undo `prepare`. Runs before the staging directory is deleted.
    fn tear_down(&self, _destination: &Path) -> StagehandResult<()> {
        Ok(())
    }
}
