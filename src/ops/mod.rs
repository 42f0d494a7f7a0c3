//! High-level operations.
//!
//! This module contains the implementation of keel commands.

pub mod clean;
pub mod doctor;
pub mod errors;
pub mod orchestrator;

pub use clean::{clean, CleanOutcome};
pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
pub use errors::OrchestratorError;
pub use orchestrator::{
    is_cmake_project, Orchestrator, OrchestratorConfig, Plan, PlannedCommand, RunReport, Stage,
    Step,
};
