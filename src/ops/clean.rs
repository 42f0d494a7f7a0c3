//! Remove the build directory.

use std::path::Path;

use anyhow::Result;

use crate::util::fs::remove_dir_all_if_exists;

/// What `clean` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    Removed,
    NothingToClean,
}

/// Remove `build_dir` and everything in it. A missing directory is not an error.
pub fn clean(build_dir: &Path) -> Result<CleanOutcome> {
    if remove_dir_all_if_exists(build_dir)? {
        tracing::info!("removed {}", build_dir.display());
        Ok(CleanOutcome::Removed)
    } else {
        tracing::debug!("{} does not exist", build_dir.display());
        Ok(CleanOutcome::NothingToClean)
    }
}
