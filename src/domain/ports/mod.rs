//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod change_watcher;
pub mod host_adapter;
pub mod sandbox;

pub use change_watcher::{ChangeCallback, ChangeWatcher, WatchHandle, MATCH_ALL};
pub use host_adapter::HostAdapter;
pub use sandbox::{Sandbox, SandboxLauncher, SandboxSetup};
