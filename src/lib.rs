//! Stagehand - local application lifecycle supervisor
//!
//! Stagehand stages the build output of one or more applications into
//! private runtime directories, applies environment-specific configuration
//! overlays, boots each application in its own sandbox process and recycles
//! it when its source changes.

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{Orchestrator, RunnableApplication, Runtime, SupervisorEvent};
pub use config::{RunConfiguration, Settings};
pub use domain::entities::{ApplicationSpec, HostSpec};
pub use error::{StagehandError, StagehandResult};
