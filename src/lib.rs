//! Keel - configure, build and test CMake projects
//!
//! This crate provides the library behind the `keel` binary: host and
//! generator detection, the configure/build/test orchestrator, and the
//! configuration and process layers it runs on.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for keel unit tests.
///
/// Only compiled for tests. Provides a recording fake process runner and
/// temporary CMake project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildType, Generator, HostOs};
pub use ops::{Orchestrator, OrchestratorConfig, OrchestratorError, Stage};
pub use util::context::GlobalContext;
