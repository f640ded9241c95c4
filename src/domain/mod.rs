//! Domain Layer
//!
//! The supervision rules of Stagehand, free of process and file system I/O
//! apart from what the policies need to sleep between retries.
//!
//! ## Structure
//!
//! - `entities/` - What gets supervised (ApplicationSpec, HostSpec)
//! - `value_objects/` - Immutable value types (ApplicationName, IgnorePatterns)
//! - `services/` - Overlay discovery and the XML transform engine
//! - `policies/` - Reload classification and sync retries
//! - `ports/` - Interfaces for hosts, sandboxes and change watchers

pub mod entities;
pub mod policies;
pub mod ports;
pub mod services;
pub mod value_objects;
