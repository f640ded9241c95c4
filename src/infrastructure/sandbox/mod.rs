//! Execution sandboxes backed by child processes.

mod process;
pub mod protocol;

pub use process::{ProcessLauncher, ProcessSandbox};
