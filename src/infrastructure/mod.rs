//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Staging, home directory and application locks
//! - `transform/` - Configuration overlay tree walker
//! - `hosts/` - Host adapters and their registry
//! - `sandbox/` - Child-process sandboxes and the bootstrap wire protocol
//! - `watcher/` - `notify`-backed change watcher

pub mod fs;
pub mod hosts;
pub mod sandbox;
pub mod transform;
pub mod watcher;

pub use hosts::HostRegistry;
pub use sandbox::ProcessLauncher;
pub use transform::ConfigTransformer;
pub use watcher::NotifyWatcher;
