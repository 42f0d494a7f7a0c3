//! `keel clean` command

use anyhow::Result;

use crate::cli::PipelineArgs;
use keel::ops::{clean, CleanOutcome};
use keel::util::shell::{Shell, Status};

pub fn execute(args: &PipelineArgs, shell: &Shell) -> Result<()> {
    let orch = super::orchestrator(args)?;
    let build_dir = &orch.config().build_dir;

    match clean(build_dir)? {
        CleanOutcome::Removed => shell.status(Status::Removed, build_dir.display()),
        CleanOutcome::NothingToClean => {
            shell.note(format!("{} does not exist, nothing to clean", build_dir.display()))
        }
    }

    Ok(())
}
