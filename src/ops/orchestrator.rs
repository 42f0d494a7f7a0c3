//! Configure, build and test a CMake project.
//!
//! The orchestrator runs at most three external steps, in order:
//!
//! ```text
//! Start -> Configured -> Built -> Tested
//! ```
//!
//! Any non-zero exit or missing precondition moves it to `Failed` and aborts
//! the remaining steps. `Failed` is final: every later step is refused without
//! spawning anything. Nothing is retried.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::{BuildType, Generator, HostOs};
use crate::ops::errors::OrchestratorError;
use crate::util::fs::ensure_dir;
use crate::util::process::{ProcessBuilder, ProcessRunner, ProcessStatus};

/// Configuration fixed for the lifetime of an orchestrator.
///
/// The same build directory and build type are passed to every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// CMake source tree
    pub source_dir: PathBuf,
    /// Where generated build files and artifacts go
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    /// Explicit generator; skips detection
    pub generator: Option<Generator>,
    /// Fall back to Unix Makefiles when Ninja is missing
    pub allow_makefile_fallback: bool,
    /// `--parallel` for the build step
    pub jobs: Option<u32>,
    /// Extra configure arguments
    pub cmake_args: Vec<String>,
    /// Pass `--output-on-failure` to ctest
    pub output_on_failure: bool,
    /// Extra ctest arguments
    pub ctest_args: Vec<String>,
}

impl OrchestratorConfig {
    /// Config with default settings for the given source and build directories.
    pub fn new(source_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        OrchestratorConfig {
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            build_type: BuildType::default(),
            generator: None,
            allow_makefile_fallback: true,
            jobs: None,
            cmake_args: Vec::new(),
            output_on_failure: true,
            ctest_args: Vec::new(),
        }
    }
}

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Start,
    Configured,
    Built,
    Tested,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::Configured => "configured",
            Stage::Built => "built",
            Stage::Tested => "tested",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One external step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Configure,
    Build,
    Test,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Configure => "configure",
            Step::Build => "build",
            Step::Test => "test",
        };
        f.write_str(s)
    }
}

impl Step {
    /// Steps needed to reach `target` from `Start`.
    pub fn until(target: Stage) -> &'static [Step] {
        match target {
            Stage::Start | Stage::Failed => &[],
            Stage::Configured => &[Step::Configure],
            Stage::Built => &[Step::Configure, Step::Build],
            Stage::Tested => &[Step::Configure, Step::Build, Step::Test],
        }
    }
}

/// A command the orchestrator would run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    pub step: Step,
    pub command: ProcessBuilder,
}

/// Full plan for a run, as printed by `--plan`.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<Generator>,
    /// Whether the generator picks the build type at build time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_config: Option<bool>,
    pub build_type: BuildType,
    pub build_dir: PathBuf,
    pub commands: Vec<PlannedCommand>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub generator: Option<Generator>,
    pub stage: Stage,
    /// Command lines executed, in order
    pub commands: Vec<String>,
}

/// Sequences the configure, build and test steps.
#[derive(Debug)]
pub struct Orchestrator<R: ProcessRunner> {
    config: OrchestratorConfig,
    runner: R,
    host: HostOs,
    stage: Stage,
    executed: Vec<String>,
}

impl<R: ProcessRunner> Orchestrator<R> {
    pub fn new(config: OrchestratorConfig, runner: R) -> Self {
        Orchestrator {
            config,
            runner,
            host: HostOs::current(),
            stage: Stage::Start,
            executed: Vec::new(),
        }
    }

    /// Override host detection.
    pub fn with_host(mut self, host: HostOs) -> Self {
        self.host = host;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn host(&self) -> &HostOs {
        &self.host
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Choose the generator for the configure step.
    ///
    /// An explicit generator always wins. Windows hosts get Visual Studio
    /// without probing. Elsewhere Ninja is used if `ninja --version`
    /// succeeds, otherwise Unix Makefiles.
    pub fn detect_generator(&self) -> Result<Generator> {
        if let Some(ref generator) = self.config.generator {
            tracing::debug!("using configured generator `{}`", generator);
            return Ok(generator.clone());
        }

        if self.host.is_windows() {
            return Ok(Generator::VisualStudio);
        }

        let probe = ProcessBuilder::new("ninja").arg("--version");
        if self.runner.is_available(&probe) {
            return Ok(Generator::Ninja);
        }
        tracing::debug!("ninja not available on {}", self.host);

        if self.config.allow_makefile_fallback {
            return Ok(Generator::UnixMakefiles);
        }

        Err(OrchestratorError::NoGeneratorFound {
            host: self.host.to_string(),
        }
        .into())
    }

    pub fn configure_command(&self, generator: &Generator) -> ProcessBuilder {
        ProcessBuilder::new("cmake")
            .arg("-S")
            .arg(&self.config.source_dir)
            .arg("-B")
            .arg(&self.config.build_dir)
            .arg("-G")
            .arg(generator.as_str())
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.config.build_type))
            .args(&self.config.cmake_args)
    }

    pub fn build_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new("cmake")
            .arg("--build")
            .arg(&self.config.build_dir)
            .arg("--config")
            .arg(self.config.build_type.as_str());

        if let Some(jobs) = self.config.jobs {
            cmd = cmd.arg("--parallel").arg(jobs.to_string());
        }

        cmd
    }

    pub fn test_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new("ctest");
        if self.config.output_on_failure {
            cmd = cmd.arg("--output-on-failure");
        }
        cmd.arg("-C")
            .arg(self.config.build_type.as_str())
            .args(&self.config.ctest_args)
            .cwd(&self.config.build_dir)
    }

    /// Generate build files into the build directory.
    ///
    /// The build directory is created first; an existing one is reused.
    pub fn configure(&mut self, generator: &Generator) -> Result<()> {
        self.check_transition(Step::Configure)?;
        tracing::debug!(
            "configuring {} ({}, {})",
            self.config.source_dir.display(),
            generator,
            self.config.build_type
        );
        if generator.is_multi_config() {
            tracing::debug!("{} is multi-config; `--config` selects the build type", generator);
        }

        if let Err(e) = ensure_dir(&self.config.build_dir) {
            self.stage = Stage::Failed;
            return Err(e);
        }

        let cmd = self.configure_command(generator);
        let status = self.execute(&cmd)?;
        if !status.success() {
            return self.fail(OrchestratorError::ConfigureFailed {
                command: cmd.display_command(),
                code: status.code,
            });
        }

        self.stage = Stage::Configured;
        Ok(())
    }

    /// Build the configured project.
    ///
    /// Requires a successful configure first.
    pub fn build(&mut self) -> Result<()> {
        self.check_transition(Step::Build)?;
        tracing::debug!("building {}", self.config.build_dir.display());

        let cmd = self.build_command();
        let status = self.execute(&cmd)?;
        if !status.success() {
            return self.fail(OrchestratorError::BuildFailed {
                command: cmd.display_command(),
                code: status.code,
            });
        }

        self.stage = Stage::Built;
        Ok(())
    }

    /// Run ctest inside the build directory.
    ///
    /// Allowed from `Start`, so tests can run against an earlier build.
    pub fn run_tests(&mut self) -> Result<()> {
        self.check_transition(Step::Test)?;

        let build_dir = &self.config.build_dir;
        if !build_dir.exists() {
            let path = build_dir.clone();
            return self.fail(OrchestratorError::MissingBuildDirectory { path });
        }
        if !build_dir.is_dir() {
            let path = build_dir.clone();
            return self.fail(OrchestratorError::BuildDirectoryNotADirectory { path });
        }

        tracing::debug!("testing {}", self.config.build_dir.display());

        let cmd = self.test_command();
        let status = self.execute(&cmd)?;
        if !status.success() {
            return self.fail(OrchestratorError::TestRunFailed {
                command: cmd.display_command(),
                code: status.code,
            });
        }

        self.stage = Stage::Tested;
        Ok(())
    }

    /// Run every step needed to reach `target`, stopping at the first failure.
    pub fn run(&mut self, target: Stage) -> Result<RunReport> {
        self.run_steps(Step::until(target))
    }

    /// Run `steps` in order, stopping at the first failure.
    ///
    /// The generator is detected only when a configure step is included.
    pub fn run_steps(&mut self, steps: &[Step]) -> Result<RunReport> {
        let mut generator = None;

        for step in steps {
            match step {
                Step::Configure => {
                    self.check_transition(Step::Configure)?;
                    let chosen = match self.detect_generator() {
                        Ok(g) => g,
                        Err(e) => {
                            self.stage = Stage::Failed;
                            return Err(e);
                        }
                    };
                    self.configure(&chosen)?;
                    generator = Some(chosen);
                }
                Step::Build => self.build()?,
                Step::Test => self.run_tests()?,
            }
        }

        Ok(RunReport {
            generator,
            stage: self.stage,
            commands: self.executed.clone(),
        })
    }

    /// Describe what `run_steps(steps)` would execute without changing
    /// anything on disk. Generator detection may still probe for Ninja.
    pub fn plan(&self, steps: &[Step]) -> Result<Plan> {
        let generator = if steps.contains(&Step::Configure) {
            Some(self.detect_generator()?)
        } else {
            None
        };

        let commands = steps
            .iter()
            .filter_map(|step| {
                let command = match step {
                    Step::Configure => self.configure_command(generator.as_ref()?),
                    Step::Build => self.build_command(),
                    Step::Test => self.test_command(),
                };
                Some(PlannedCommand {
                    step: *step,
                    command,
                })
            })
            .collect();

        Ok(Plan {
            host: self.host.to_string(),
            multi_config: generator.as_ref().map(Generator::is_multi_config),
            generator,
            build_type: self.config.build_type,
            build_dir: self.config.build_dir.clone(),
            commands,
        })
    }

    fn execute(&mut self, cmd: &ProcessBuilder) -> Result<ProcessStatus> {
        let line = cmd.display_command();
        tracing::info!("Running command: {}", line);
        self.executed.push(line);

        self.runner.status(cmd).inspect_err(|_| self.stage = Stage::Failed)
    }

    /// Refuse `step` when the current stage does not allow it.
    fn check_transition(&mut self, step: Step) -> Result<()> {
        let allowed = match step {
            Step::Configure | Step::Test => self.stage != Stage::Failed,
            Step::Build => matches!(
                self.stage,
                Stage::Configured | Stage::Built | Stage::Tested
            ),
        };
        if allowed {
            return Ok(());
        }

        self.fail(OrchestratorError::InvalidTransition {
            step: step.to_string(),
            stage: self.stage.to_string(),
        })
    }

    fn fail<T>(&mut self, err: OrchestratorError) -> Result<T> {
        tracing::debug!("pipeline failed at {}: {}", self.stage, err);
        self.stage = Stage::Failed;
        Err(err.into())
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").is_file()
}
