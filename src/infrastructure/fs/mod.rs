//! File System Implementations
//!
//! Staging, home directory resolution and cross-process locks.

mod home;
mod lock;
mod stager;

pub use home::{stagehand_home_dir, STAGEHAND_TEST_HOME_VAR};
pub use lock::ApplicationLock;
pub use stager::{DeploymentStager, MirrorStats, SyncOutcome};
