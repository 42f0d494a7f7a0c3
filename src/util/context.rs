//! Global context for keel operations.
//!
//! Provides centralized access to the project root and config locations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, Config};

/// Name of the per-project directory holding keel state.
pub const PROJECT_DIR_NAME: &str = ".keel";

/// Global context shared by all commands.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root (the directory keel was started in)
    cwd: PathBuf,

    /// Global config directory (~/.keel), if a home directory exists
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context rooted at the current working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd`.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            home: global_config_dir(),
        }
    }

    /// Override the global config directory.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.cwd
    }

    /// `.keel` directory inside the project.
    pub fn project_keel_dir(&self) -> PathBuf {
        self.cwd.join(PROJECT_DIR_NAME)
    }

    /// Path to the global config file, if a home directory is known.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.project_keel_dir().join("config.toml")
    }

    /// Load and merge global and project configuration.
    pub fn load_config(&self) -> Config {
        let global = self.global_config_path().unwrap_or_default();
        let config = load_config(&global, &self.project_config_path());
        tracing::debug!("loaded config: {:?}", config);
        config
    }
}
