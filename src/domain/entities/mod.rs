//! Domain Entities
//!
//! - `ApplicationSpec` - One application to supervise
//! - `HostSpec` - A host runtime requested for that application

mod application_spec;

pub use application_spec::{
    ApplicationSpec, ApplicationSpecBuilder, HostArguments, HostSpec, DEFAULT_ENVIRONMENT,
};
