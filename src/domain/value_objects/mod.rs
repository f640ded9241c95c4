//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod application_name;
mod ignore_patterns;

pub use application_name::{ApplicationName, NamePolicy, FALLBACK_APPLICATION_NAME};
pub use ignore_patterns::IgnorePatterns;
