//! Subprocess execution.
//!
//! Everything that spawns a child process goes through [`ProcessRunner`],
//! so the orchestrator can be driven by [`SystemRunner`] in production and
//! by a recording fake in tests.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};

/// Builder for a subprocess invocation.
///
/// Arguments are kept as `OsString` so paths reach the child unchanged.
/// Only [`display_command`](Self::display_command) and serialization render
/// them lossily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessBuilder {
    program: PathBuf,
    #[serde(serialize_with = "serialize_lossy")]
    args: Vec<OsString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<PathBuf>,
}

fn serialize_lossy<S: Serializer>(args: &[OsString], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(args.iter().map(|arg| arg.to_string_lossy()))
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Exit status of a finished child process.
///
/// `code` is `None` when the process was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    pub code: Option<i32>,
}

impl ProcessStatus {
    pub fn from_code(code: i32) -> Self {
        ProcessStatus { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessStatus {
    fn from(status: ExitStatus) -> Self {
        ProcessStatus {
            code: status.code(),
        }
    }
}

/// Capability for running external programs.
pub trait ProcessRunner {
    /// Run with inherited stdio and wait for the child to exit.
    fn status(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus>;

    /// Run with captured output, discarding it. Used for tool detection.
    fn probe(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus>;

    /// Run and capture stdout. Used to read tool versions.
    fn capture(&self, cmd: &ProcessBuilder) -> Result<(ProcessStatus, String)>;

    /// Whether `cmd` can be spawned and exits successfully.
    fn is_available(&self, cmd: &ProcessBuilder) -> bool {
        match self.probe(cmd) {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!("probe `{}` failed: {:#}", cmd.display_command(), e);
                false
            }
        }
    }
}

/// Runs commands on the host with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn status(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        let status = cmd
            .build_command()
            .status()
            .with_context(|| format!("failed to execute `{}`", cmd.display_command()))?;
        Ok(status.into())
    }

    fn probe(&self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        let status = cmd
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to spawn `{}`", cmd.display_command()))?;
        Ok(status.into())
    }

    fn capture(&self, cmd: &ProcessBuilder) -> Result<(ProcessStatus, String)> {
        let output = cmd
            .build_command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn `{}`", cmd.display_command()))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok((output.status.into(), stdout))
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cmake").args(["--build", "build", "--config", "Debug"]);

        assert_eq!(pb.display_command(), "cmake --build build --config Debug");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_args_are_kept_verbatim() {
        use std::os::unix::ffi::OsStrExt;

        let dir = OsStr::from_bytes(b"/tmp/bu\xffild");
        let pb = ProcessBuilder::new("cmake").arg("-B").arg(dir);

        assert_eq!(pb.get_args()[1].as_bytes(), b"/tmp/bu\xffild");
        assert_eq!(pb.display_command(), "cmake -B /tmp/bu\u{FFFD}ild");

        let json = serde_json::to_value(&pb).unwrap();
        assert_eq!(json["args"][1], "/tmp/bu\u{FFFD}ild");
    }

    #[test]
    fn test_cwd_is_recorded() {
        let pb = ProcessBuilder::new("ctest").cwd("build");
        assert_eq!(pb.get_cwd(), Some(Path::new("build")));
    }

    #[test]
    fn test_process_status_success() {
        assert!(ProcessStatus::from_code(0).success());
        assert!(!ProcessStatus::from_code(1).success());
        assert!(!ProcessStatus { code: None }.success());
    }

    #[test]
    fn test_missing_program_is_not_available() {
        let pb = ProcessBuilder::new("keel-definitely-not-a-real-tool").arg("--version");
        assert!(!SystemRunner.is_available(&pb));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_capture() {
        let (status, stdout) = SystemRunner
            .capture(&ProcessBuilder::new("echo").arg("hello"))
            .unwrap();

        assert!(status.success());
        assert!(stdout.contains("hello"));
    }
}
