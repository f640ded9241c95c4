//! Terminal concerns of the binary: log output and key input

pub mod keys;
pub mod logging;
