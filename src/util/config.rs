//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.keel/config.toml` - User-wide defaults
//! - Project: `.keel/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{BuildType, Generator};
use crate::ops::orchestrator::OrchestratorConfig;
use crate::util::fs::resolve_path;

/// Default build directory, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Keel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configure/build settings
    pub build: BuildConfig,

    /// ctest settings
    pub test: TestConfig,
}

/// Configure and build settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Build directory (relative paths resolve against the project root)
    pub dir: Option<PathBuf>,

    /// CMake build type
    #[serde(rename = "type")]
    pub build_type: Option<BuildType>,

    /// CMake source directory
    pub source_dir: Option<PathBuf>,

    /// Generator override; skips detection
    pub generator: Option<String>,

    /// Fall back to Unix Makefiles when Ninja is missing
    pub allow_makefile_fallback: Option<bool>,

    /// Parallel build jobs (None = generator default)
    pub jobs: Option<u32>,

    /// Extra arguments for the configure step
    pub cmake_args: Vec<String>,
}

/// Test step settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TestConfig {
    /// Pass `--output-on-failure` to ctest
    pub output_on_failure: Option<bool>,

    /// Extra arguments for ctest
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.dir.is_some() {
            self.build.dir = other.build.dir;
        }
        if other.build.build_type.is_some() {
            self.build.build_type = other.build.build_type;
        }
        if other.build.source_dir.is_some() {
            self.build.source_dir = other.build.source_dir;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.allow_makefile_fallback.is_some() {
            self.build.allow_makefile_fallback = other.build.allow_makefile_fallback;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if !other.build.cmake_args.is_empty() {
            self.build.cmake_args = other.build.cmake_args;
        }

        if other.test.output_on_failure.is_some() {
            self.test.output_on_failure = other.test.output_on_failure;
        }
        if !other.test.args.is_empty() {
            self.test.args = other.test.args;
        }
    }

    /// Resolve into the orchestrator configuration for a project rooted at `root`.
    pub fn to_orchestrator_config(&self, root: &Path) -> Result<OrchestratorConfig> {
        let generator = self
            .build
            .generator
            .as_deref()
            .map(|g| g.parse::<Generator>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid generator in config: {}", e))?;

        if self.build.jobs == Some(0) {
            bail!("invalid `jobs = 0` in config; expected at least 1");
        }

        let build_dir = self
            .build
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        let source_dir = match self.build.source_dir {
            Some(ref dir) => resolve_path(root, dir),
            None => root.to_path_buf(),
        };

        Ok(OrchestratorConfig {
            source_dir,
            build_dir: resolve_path(root, &build_dir),
            build_type: self.build.build_type.unwrap_or_default(),
            generator,
            allow_makefile_fallback: self.build.allow_makefile_fallback.unwrap_or(true),
            jobs: self.build.jobs,
            cmake_args: self.build.cmake_args.clone(),
            output_on_failure: self.test.output_on_failure.unwrap_or(true),
            ctest_args: self.test.args.clone(),
        })
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keel/config.toml)
/// 2. Global config (~/.keel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global keel config directory (~/.keel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".keel"))
}
