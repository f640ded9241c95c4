//! Domain Policies
//!
//! Rules that govern how a supervisor reacts to change and failure.

mod reload_policy;
mod retry_policy;

pub use reload_policy::{normalise_extension, ChangeAction, ReloadPolicy, DEFAULT_RELOAD_EXTENSIONS};
pub use retry_policy::{RetryPolicy, DEFAULT_SYNC_ATTEMPTS, DEFAULT_SYNC_DELAY};
