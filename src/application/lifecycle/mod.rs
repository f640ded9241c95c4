//! Application lifecycle
//!
//! A [`RunnableApplication`] ties staging, configuration transforms, host
//! preparation, the execution sandbox and the source watcher together:
//!
//! ```text
//! STOPPED --start--> RUNNING --stop--> STOPPED
//! RUNNING --recycle--> stop, start --> RUNNING (STOPPED when start fails)
//! ```
//!
//! Starting an application that already has an instance stops it first, so
//! two sandboxes for the same application never coexist.

mod runnable;
mod services;


pub use runnable::{ApplicationState, RunnableApplication};
pub use services::{ChangeSink, LifecycleServices};
