//! Bootstrap wire protocol
//!
//! Newline-delimited JSON. The supervisor writes one [`Request`] per line to
//! the bootstrapper's stdin and reads exactly one [`Response`] line back from
//! its stdout. Any other stdout line is application output.

use serde::{Deserialize, Serialize};

use crate::domain::entities::HostArguments;

/// A call on the bootstrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Initialize {
        path: String,
    },
    Start {
        environment: String,
        #[serde(rename = "hostArguments", default)]
        host_arguments: HostArguments,
    },
    Stop,
}

impl Request {
    /// Operation name, as used in errors and logs.
    pub fn operation(&self) -> &'static str {
        match self {
            Request::Initialize { .. } => "initialize",
            Request::Start { .. } => "start",
            Request::Stop => "stop",
        }
    }
}

/// The bootstrapper's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok,
    Error { message: String },
}

/// Serialise a message as one protocol line (without the newline).
pub fn encode<T: Serialize>(message: &T) -> serde_json::Result<String> {
    serde_json::to_string(message)
}

/// Parse a response line; `None` when the line is not a protocol response.
pub fn parse_response(line: &str) -> Option<Response> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Parse a request line.
pub fn parse_request(line: &str) -> serde_json::Result<Request> {
    serde_json::from_str(line.trim())
}
