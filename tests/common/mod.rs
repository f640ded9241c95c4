//! Common test utilities for Stagehand integration and scenario tests.
//!
//! This module provides:
//! - `FakeLauncher` / `FakeWatcher`: re-exported from `stagehand::application::testing`
//! - `SourceTree`: builder for application build-output trees
//! - `TestEnv`: isolated runtime root for driving the `stagehand` binary

#![allow(dead_code, unused_imports)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use stagehand::application::testing::{FakeLauncher, FakeWatcher};
pub use fixtures::*;
