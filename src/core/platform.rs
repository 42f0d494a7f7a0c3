//! Host platform detection.

use std::fmt;

/// Operating system the orchestrator runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Other(String),
}

impl HostOs {
    /// Detect the current operating system.
    pub fn current() -> Self {
        Self::from_id(std::env::consts::OS)
    }

    /// Map an OS identifier (as in `std::env::consts::OS`) to a host.
    pub fn from_id(id: &str) -> Self {
        match id.to_lowercase().as_str() {
            "windows" => HostOs::Windows,
            "macos" | "darwin" => HostOs::MacOs,
            "linux" => HostOs::Linux,
            other => HostOs::Other(other.to_string()),
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostOs::Windows)
    }

    pub fn as_str(&self) -> &str {
        match self {
            HostOs::Windows => "windows",
            HostOs::MacOs => "macos",
            HostOs::Linux => "linux",
            HostOs::Other(id) => id,
        }
    }
}

impl Default for HostOs {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
