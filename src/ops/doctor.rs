//! Environment health checks.
//!
//! `keel doctor` verifies that the tools the pipeline shells out to are
//! installed, and reports which generator would be selected.
//!
//! ## Checks Performed
//!
//! - CMake (required)
//! - CTest (required)
//! - Ninja (optional, preferred generator)
//! - make / nmake (optional, fallback generator)
//!
//! nmake has no `--version`; it is asked for `/?` and its banner is used.

use std::fmt::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::core::{Generator, HostOs};
use crate::ops::orchestrator::Orchestrator;
use crate::util::process::{find_executable, ProcessBuilder, ProcessRunner};

/// Result of a single health check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// Human-readable status message
    pub message: String,
    pub path: Option<PathBuf>,
    /// First line of the tool's version output
    pub version: Option<String>,
    pub duration: Duration,
    /// Whether a failure makes the pipeline unusable
    pub required: bool,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub host: HostOs,
    pub checks: Vec<CheckResult>,
    /// Generator the pipeline would use, or why none could be chosen
    pub generator: Result<Generator, String>,
    pub total_duration: Duration,
}

impl DoctorReport {
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Run all checks through `orch`'s process runner.
pub fn doctor<R: ProcessRunner>(orch: &Orchestrator<R>) -> DoctorReport {
    let start = Instant::now();
    let runner = orch.runner();
    let host = orch.host().clone();

    let make = if host.is_windows() {
        ProcessBuilder::new("nmake").arg("/?")
    } else {
        version_command("make")
    };

    let checks = vec![
        check_tool(runner, "CMake", version_command("cmake"), true),
        check_tool(runner, "CTest", version_command("ctest"), true),
        check_tool(runner, "Ninja", version_command("ninja"), false),
        check_tool(runner, "Make", make, false),
    ];

    let generator = orch.detect_generator().map_err(|e| e.to_string());

    DoctorReport {
        host,
        checks,
        generator,
        total_duration: start.elapsed(),
    }
}

fn version_command(program: &str) -> ProcessBuilder {
    ProcessBuilder::new(program).arg("--version")
}

fn check_tool<R: ProcessRunner>(
    runner: &R,
    name: &str,
    cmd: ProcessBuilder,
    required: bool,
) -> CheckResult {
    let start = Instant::now();
    let program = cmd.get_program().display().to_string();

    let result = match runner.capture(&cmd) {
        Ok((status, stdout)) if status.success() => {
            let version = stdout
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("");
            CheckResult::pass(name, format!("{} is available", program))
                .with_path(find_executable(&program))
                .with_version(version)
        }
        Ok((status, _)) => CheckResult::fail(
            name,
            format!("`{}` exited with {:?}", cmd.display_command(), status.code),
        ),
        Err(_) => CheckResult::fail(name, format!("{} not found on PATH", program)),
    };

    let result = if required { result } else { result.optional() };
    result.with_duration(start.elapsed())
}

/// Format a doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Keel Doctor");
    let _ = writeln!(output, "===========\n");
    let _ = writeln!(output, "Host: {}\n", report.host);

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        let _ = write!(output, "  {} {}{}", status, check.name, required);
        match &check.version {
            Some(version) if !version.is_empty() => {
                let _ = writeln!(output, " - {}", version);
            }
            _ => {
                let _ = writeln!(output);
            }
        }

        if verbose {
            let _ = writeln!(output, "      {}", check.message);
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
            let _ = writeln!(output, "      Took: {:?}", check.duration);
        }
    }

    let _ = writeln!(output);
    match &report.generator {
        Ok(generator) => {
            let _ = writeln!(output, "Generator: {}", generator);
        }
        Err(e) => {
            let _ = writeln!(output, "Generator: none ({})", e);
        }
    }

    let _ = writeln!(
        output,
        "Summary: {} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    );

    let required_failed = report.required_failed_count();
    if required_failed > 0 {
        let _ = writeln!(
            output,
            "\nWarning: {} required check(s) failed. keel cannot configure or test this project.",
            required_failed
        );
    }

    output
}
