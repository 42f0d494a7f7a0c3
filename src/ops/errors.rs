//! Orchestrator error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A failed pipeline step.
///
/// Raised through `anyhow::Result`; callers that care about the kind use
/// `err.downcast_ref::<OrchestratorError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("no compatible build system found on {host}; install Ninja or Visual Studio")]
    NoGeneratorFound { host: String },

    #[error("configure step failed: `{command}` {}", exit_description(.code))]
    ConfigureFailed { command: String, code: Option<i32> },

    #[error("build step failed: `{command}` {}", exit_description(.code))]
    BuildFailed { command: String, code: Option<i32> },

    #[error("build directory '{}' does not exist; cannot run tests", .path.display())]
    MissingBuildDirectory { path: PathBuf },

    #[error("build path '{}' is not a directory; cannot run tests", .path.display())]
    BuildDirectoryNotADirectory { path: PathBuf },

    #[error("cannot {step} from the '{stage}' stage")]
    InvalidTransition { step: String, stage: String },

    #[error("tests failed: `{command}` {}", exit_description(.code))]
    TestRunFailed { command: String, code: Option<i32> },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl OrchestratorError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            OrchestratorError::NoGeneratorFound { .. } => diag
                .with_suggestion(suggestions::INSTALL_NINJA)
                .with_suggestion(suggestions::ENABLE_FALLBACK)
                .with_suggestion(suggestions::PICK_GENERATOR),

            OrchestratorError::ConfigureFailed { .. } => diag
                .with_context("CMake could not generate build files; see its output above")
                .with_suggestion(suggestions::CHECK_ENVIRONMENT)
                .with_suggestion(suggestions::VERBOSE),

            OrchestratorError::BuildFailed { .. } => diag
                .with_context("the generated build tool reported errors; see its output above")
                .with_suggestion(suggestions::VERBOSE),

            OrchestratorError::MissingBuildDirectory { path } => diag
                .with_location(path.clone())
                .with_suggestion(suggestions::RUN_BUILD_FIRST),

            OrchestratorError::BuildDirectoryNotADirectory { path } => diag
                .with_location(path.clone())
                .with_suggestion(suggestions::PICK_BUILD_DIR),

            OrchestratorError::InvalidTransition { .. } => {
                diag.with_context("an earlier step failed or was skipped")
            }

            OrchestratorError::TestRunFailed { .. } => {
                diag.with_context("ctest reported failing tests; see its output above")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = OrchestratorError::ConfigureFailed {
            command: "cmake -S . -B build".to_string(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "configure step failed: `cmake -S . -B build` exited with code 1"
        );

        let err = OrchestratorError::TestRunFailed {
            command: "ctest".to_string(),
            code: None,
        };
        assert_eq!(
            err.to_string(),
            "tests failed: `ctest` was terminated by a signal"
        );

        let err = OrchestratorError::MissingBuildDirectory {
            path: PathBuf::from("build"),
        };
        assert_eq!(
            err.to_string(),
            "build directory 'build' does not exist; cannot run tests"
        );
    }

    #[test]
    fn test_missing_build_dir_diagnostic() {
        let diag = OrchestratorError::MissingBuildDirectory {
            path: PathBuf::from("/project/build"),
        }
        .to_diagnostic();

        assert_eq!(diag.location, Some(PathBuf::from("/project/build")));
        assert_eq!(diag.suggestions, vec![suggestions::RUN_BUILD_FIRST]);
    }

    #[test]
    fn test_build_path_is_file_message() {
        let err = OrchestratorError::BuildDirectoryNotADirectory {
            path: PathBuf::from("build"),
        };
        assert_eq!(
            err.to_string(),
            "build path 'build' is not a directory; cannot run tests"
        );
        assert_eq!(err.to_diagnostic().suggestions, vec![suggestions::PICK_BUILD_DIR]);
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = OrchestratorError::InvalidTransition {
            step: "build".to_string(),
            stage: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "cannot build from the 'failed' stage");
    }

    #[test]
    fn test_no_generator_diagnostic_suggests_ninja() {
        let diag = OrchestratorError::NoGeneratorFound {
            host: "linux".to_string(),
        }
        .to_diagnostic();

        assert!(diag.message.contains("linux"));
        assert!(diag.suggestions.iter().any(|s| s.contains("Ninja")));
    }
}
