//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::BuildType;
use crate::ops::orchestrator::OrchestratorConfig;

/// Minimal top-level CMakeLists.txt with one test.
pub const CMAKE_LISTS: &str = r#"cmake_minimum_required(VERSION 3.16)
project(fixture CXX)

enable_testing()
add_executable(fixture_test main.cpp)
add_test(NAME fixture_test COMMAND fixture_test)
"#;

/// A throwaway CMake project on disk.
#[derive(Debug)]
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    /// Create a project with a CMakeLists.txt and no build directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("CMakeLists.txt"), CMAKE_LISTS).unwrap();
        std::fs::write(dir.path().join("main.cpp"), "int main() { return 0; }\n").unwrap();
        TempProject { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn build_dir(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    /// Create the build directory, as a previous configure would have.
    pub fn with_build_dir(self) -> Self {
        std::fs::create_dir_all(self.build_dir()).unwrap();
        self
    }

    /// Orchestrator config for this project with default settings.
    pub fn config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new(self.root(), self.build_dir())
    }

    pub fn config_with_type(&self, build_type: BuildType) -> OrchestratorConfig {
        OrchestratorConfig {
            build_type,
            ..self.config()
        }
    }
}

impl Default for TempProject {
    fn default() -> Self {
        TempProject::new()
    }
}
