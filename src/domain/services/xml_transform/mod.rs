//! XML configuration transforms
//!
//! [`XmlDocument`] keeps a document's formatting intact; [`XmlTransformation`]
//! applies an environment overlay to it.

mod document;
mod engine;

pub use document::{XmlAttribute, XmlDocument, XmlElement, XmlError, XmlNode};
pub use engine::{TransformError, TransformReport, XmlTransformation, XDT_NAMESPACE};
