//! Test utilities for keel unit tests.
//!
//! [`FakeRunner`] stands in for [`SystemRunner`](crate::util::process::SystemRunner):
//! it records every invocation and answers from a list of expectations, so
//! orchestrator tests can assert on arguments without spawning processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use keel::test_support::{FakeOutput, FakeRunner};
//!
//! let runner = FakeRunner::new();
//! runner.expect_prefix("ninja", FakeOutput::failure(1));
//! runner.set_default(FakeOutput::success());
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{ProcessBuilder, ProcessRunner, ProcessStatus};

pub use fixtures::*;

/// Canned result for a fake process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeOutput {
    /// Exit code; `None` means the program could not be spawned.
    pub code: Option<i32>,
    pub stdout: String,
}

impl FakeOutput {
    pub fn success() -> Self {
        FakeOutput {
            code: Some(0),
            stdout: String::new(),
        }
    }

    pub fn failure(code: i32) -> Self {
        FakeOutput {
            code: Some(code),
            stdout: String::new(),
        }
    }

    /// The program is not installed.
    pub fn not_found() -> Self {
        FakeOutput {
            code: None,
            stdout: String::new(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }
}

impl Default for FakeOutput {
    fn default() -> Self {
        FakeOutput::success()
    }
}

/// Pattern for matching commands in [`FakeRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    pattern: CommandPattern,
    output: FakeOutput,
}

/// How a command was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Status,
    Probe,
    Capture,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub kind: CallKind,
    pub command: String,
    /// Arguments, rendered lossily
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Whether the watched path existed when the command ran.
    pub watched_path_existed: Option<bool>,
}

#[derive(Debug, Default)]
struct State {
    expectations: Vec<Expectation>,
    calls: Vec<Invocation>,
    default_output: Option<FakeOutput>,
    watched_path: Option<PathBuf>,
}

/// Recording process runner for tests.
#[derive(Debug, Default)]
pub struct FakeRunner {
    state: Mutex<State>,
}

impl FakeRunner {
    pub fn new() -> Self {
        FakeRunner::default()
    }

    /// A runner where every command succeeds.
    pub fn succeeding() -> Self {
        let runner = FakeRunner::new();
        runner.set_default(FakeOutput::success());
        runner
    }

    pub fn expect(&self, cmd: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output)
    }

    pub fn expect_prefix(&self, prefix: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    pub fn expect_contains(&self, substring: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output)
    }

    pub fn expect_regex(&self, pattern: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::Regex(pattern.to_string()), output)
    }

    /// Output for commands that match no expectation.
    pub fn set_default(&self, output: FakeOutput) -> &Self {
        self.lock().default_output = Some(output);
        self
    }

    /// Record whether `path` exists at the moment each command runs.
    pub fn watch_path(&self, path: impl AsRef<Path>) -> &Self {
        self.lock().watched_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.lock().calls.clone()
    }

    /// Full command lines of every call, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    /// Whether any recorded command line starts with `prefix`.
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().calls.iter().any(|c| c.command.starts_with(prefix))
    }

    fn push(&self, pattern: CommandPattern, output: FakeOutput) -> &Self {
        self.lock().expectations.push(Expectation { pattern, output });
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A test that panicked while holding the lock already failed.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn run(&self, kind: CallKind, cmd: &ProcessBuilder) -> Result<FakeOutput> {
        let full_cmd = cmd.display_command();
        let mut state = self.lock();

        let watched_path_existed = state.watched_path.as_ref().map(|p| p.exists());
        state.calls.push(Invocation {
            kind,
            command: full_cmd.clone(),
            args: cmd
                .get_args()
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            cwd: cmd.get_cwd().map(Path::to_path_buf),
            watched_path_existed,
        });

        let output = state
            .expectations
            .iter()
            .find(|e| e.pattern.matches(&full_cmd))
            .map(|e| e.output.clone())
            .or_else(|| state.default_output.clone());

        match output {
            Some(output) if output.code.is_none() => {
                bail!("failed to spawn `{}`: program not found", full_cmd)
            }
            Some(output) => Ok(output),
            None => bail!("unexpected command: {}", full_cmd),
        }
    }
}

impl ProcessRunner for FakeRunner {
    fn status(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        let output = self.run(CallKind::Status, cmd)?;
        Ok(ProcessStatus { code: output.code })
    }

    fn probe(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        let output = self.run(CallKind::Probe, cmd)?;
        Ok(ProcessStatus { code: output.code })
    }

    fn capture(&self, cmd: &ProcessBuilder) -> Result<(ProcessStatus, String)> {
        let output = self.run(CallKind::Capture, cmd)?;
        Ok((ProcessStatus { code: output.code }, output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_expectation_wins() {
        let runner = FakeRunner::new();
        runner.expect("ninja --version", FakeOutput::failure(127));
        runner.expect_prefix("ninja", FakeOutput::success());

        let status = runner
            .probe(&ProcessBuilder::new("ninja").arg("--version"))
            .unwrap();
        assert_eq!(status.code, Some(127));
    }

    #[test]
    fn test_unexpected_command_errors() {
        let runner = FakeRunner::new();
        let err = runner.status(&ProcessBuilder::new("cmake")).unwrap_err();
        assert!(err.to_string().contains("unexpected command: cmake"));
        // Still recorded
        assert_eq!(runner.commands(), vec!["cmake"]);
    }

    #[test]
    fn test_not_found_is_spawn_error() {
        let runner = FakeRunner::new();
        runner.expect_prefix("ninja", FakeOutput::not_found());

        let pb = ProcessBuilder::new("ninja").arg("--version");
        assert!(runner.probe(&pb).is_err());
        assert!(!runner.is_available(&pb));
    }

    #[test]
    fn test_contains_pattern() {
        let runner = FakeRunner::succeeding();
        runner.expect_contains("--parallel", FakeOutput::failure(2));

        let plain = ProcessBuilder::new("cmake").args(["--build", "build"]);
        let parallel = plain.clone().args(["--parallel", "4"]);

        assert!(runner.status(&plain).unwrap().success());
        assert_eq!(runner.status(&parallel).unwrap().code, Some(2));
    }

    #[test]
    fn test_regex_and_capture() {
        let runner = FakeRunner::new();
        runner.expect_regex(
            r"^cmake --version$",
            FakeOutput::success().with_stdout("cmake version 3.28.1\n"),
        );

        let (status, stdout) = runner
            .capture(&ProcessBuilder::new("cmake").arg("--version"))
            .unwrap();
        assert!(status.success());
        assert_eq!(stdout, "cmake version 3.28.1\n");
        assert_eq!(runner.calls()[0].kind, CallKind::Capture);
    }
}
