//! Application Layer
//!
//! Use cases that drive supervised applications.
//! This layer:
//! - Depends on Domain layer (entities, policies, ports)
//! - Does NOT contain staging or transform rules (those are in Domain and Infrastructure)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Components
//!
//! - `RunnableApplication` - Stage, transform, boot, watch, recycle one application
//! - `Orchestrator` - Run loop over every application with per-application failure isolation
//! - `Runtime` - Wires an orchestrator from settings and holds the application locks
//! - `testing` - In-memory launcher and watcher used by the test suites

pub mod lifecycle;
pub mod runtime;
pub mod supervisor;

#[doc(hidden)]
pub mod testing;

pub use lifecycle::{ApplicationState, ChangeSink, LifecycleServices, RunnableApplication};
pub use runtime::{lifecycle_services, Runtime};
pub use supervisor::{KeyCommand, LoopControl, Orchestrator, SupervisorEvent};
