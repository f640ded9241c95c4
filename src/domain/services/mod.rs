//! Domain Services
//!
//! Pure logic over file names and XML documents. Callers do the I/O.

mod overlay_discovery;
pub mod xml_transform;

pub use overlay_discovery::{split_stem, ConfigFileSet};
