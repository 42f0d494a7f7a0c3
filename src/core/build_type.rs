//! CMake build types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Optimization/debug profile forwarded to CMake and ctest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BuildType {
    /// Unoptimized, with debug info
    #[default]
    Debug,
    /// Optimized
    Release,
}

impl BuildType {
    /// The value CMake expects for `CMAKE_BUILD_TYPE` and `--config`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            _ => Err(format!(
                "invalid build type '{}'; expected 'Debug' or 'Release'",
                s
            )),
        }
    }
}

impl TryFrom<String> for BuildType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BuildType> for String {
    fn from(build_type: BuildType) -> Self {
        build_type.as_str().to_string()
    }
}
