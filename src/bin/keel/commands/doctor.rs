//! `keel doctor` command

use anyhow::{bail, Result};

use crate::cli::PipelineArgs;
use keel::ops::{doctor, format_report};

pub fn execute(args: &PipelineArgs, verbose: bool) -> Result<()> {
    let orch = super::orchestrator(args)?;

    let report = doctor(&orch);
    print!("{}", format_report(&report, verbose));

    if !report.all_required_passed() {
        bail!(
            "{} required tool(s) missing",
            report.required_failed_count()
        );
    }

    Ok(())
}
