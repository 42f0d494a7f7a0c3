//! CMake generators.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Visual Studio release targeted on Windows hosts.
pub const VISUAL_STUDIO_GENERATOR: &str = "Visual Studio 17 2022";

/// Build-file generator passed to `cmake -G`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Generator {
    /// Native IDE project files on Windows
    VisualStudio,
    /// Ninja build files
    Ninja,
    /// Generic makefiles
    UnixMakefiles,
    /// Any other generator, by its CMake name
    Named(String),
}

impl Generator {
    /// The name CMake knows this generator by.
    pub fn as_str(&self) -> &str {
        match self {
            Generator::VisualStudio => VISUAL_STUDIO_GENERATOR,
            Generator::Ninja => "Ninja",
            Generator::UnixMakefiles => "Unix Makefiles",
            Generator::Named(name) => name,
        }
    }

    /// Whether the generator holds several configurations in one build dir.
    ///
    /// Multi-config generators ignore `CMAKE_BUILD_TYPE` and select the
    /// configuration with `--config` at build time.
    pub fn is_multi_config(&self) -> bool {
        match self {
            Generator::VisualStudio => true,
            Generator::Ninja | Generator::UnixMakefiles => false,
            Generator::Named(name) => {
                name.starts_with("Visual Studio") || name == "Xcode" || name == "Ninja Multi-Config"
            }
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err("generator name cannot be empty".to_string());
        }

        Ok(match name {
            VISUAL_STUDIO_GENERATOR => Generator::VisualStudio,
            "Ninja" => Generator::Ninja,
            "Unix Makefiles" => Generator::UnixMakefiles,
            other => Generator::Named(other.to_string()),
        })
    }
}

impl Serialize for Generator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
