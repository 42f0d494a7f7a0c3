//! Command implementations

pub mod clean;
pub mod completions;
pub mod doctor;
pub mod pipeline;

use anyhow::{Context, Result};

use crate::cli::PipelineArgs;
use keel::util::{Config, GlobalContext, SystemRunner};
use keel::Orchestrator;

/// Merge command-line settings over the loaded configuration.
///
/// Precedence: CLI (including KEEL_* env vars) > project > global > defaults.
pub fn apply_overrides(config: &mut Config, args: &PipelineArgs) {
    if let Some(ref dir) = args.build_dir {
        config.build.dir = Some(dir.clone());
    }
    if let Some(ref dir) = args.source_dir {
        config.build.source_dir = Some(dir.clone());
    }
    if let Some(build_type) = args.build_type() {
        config.build.build_type = Some(build_type);
    }
    if let Some(ref generator) = args.generator {
        config.build.generator = Some(generator.clone());
    }
    if args.jobs.is_some() {
        config.build.jobs = args.jobs;
    }
}

/// Build an orchestrator for the project in the current directory.
pub fn orchestrator(args: &PipelineArgs) -> Result<Orchestrator<SystemRunner>> {
    let ctx = GlobalContext::new()?;

    let mut config = ctx.load_config();
    apply_overrides(&mut config, args);

    let orch_config = config
        .to_orchestrator_config(ctx.project_root())
        .context("invalid build configuration")?;
    tracing::debug!("orchestrator config: {:?}", orch_config);

    Ok(Orchestrator::new(orch_config, SystemRunner))
}
