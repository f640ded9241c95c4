//! Supervisor
//!
//! Watcher callbacks, key presses and the termination signal all end up on
//! one channel that a single thread drains. Lifecycle operations therefore
//! never overlap: a sync cannot race a recycle of the same application.

mod event;
mod orchestrator;

#[cfg(test)]
mod tests;

pub use event::{KeyCommand, LoopControl, SupervisorEvent};
pub use orchestrator::Orchestrator;
