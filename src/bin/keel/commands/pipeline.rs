//! `keel`, `keel all`, `keel configure`, `keel build` and `keel test`

use anyhow::Result;

use crate::cli::PipelineArgs;
use keel::ops::{is_cmake_project, OrchestratorConfig, Step};
use keel::util::diagnostic::{suggestions, Diagnostic};
use keel::util::shell::{Shell, Status};

pub fn execute(args: &PipelineArgs, steps: &[Step], shell: &Shell) -> Result<()> {
    let mut orch = super::orchestrator(args)?;

    if args.plan {
        let plan = orch.plan(steps)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let source_dir = &orch.config().source_dir;
    if steps.contains(&Step::Configure) && !is_cmake_project(source_dir) {
        let diag = Diagnostic::warning("no CMakeLists.txt in the source directory")
            .with_location(source_dir.clone())
            .with_suggestion(suggestions::SET_SOURCE_DIR);
        shell.diagnostic(&diag);
    }

    // One step at a time so each gets its own status line.
    let mut generator = None;
    for &step in steps {
        let (status, target) = step_status(step, orch.config());
        shell.status(status, target);

        let report = orch.run_steps(&[step])?;
        generator = report.generator.or(generator);
    }

    let config = orch.config();
    let generator = generator
        .map(|g| format!(" with {}", g))
        .unwrap_or_default();
    shell.status(
        Status::Finished,
        format!(
            "`{}` {} in {}{}",
            config.build_type,
            orch.stage(),
            config.build_dir.display(),
            generator
        ),
    );

    Ok(())
}

fn step_status(step: Step, config: &OrchestratorConfig) -> (Status, String) {
    match step {
        Step::Configure => (
            Status::Configuring,
            format!("{} ({})", config.source_dir.display(), config.build_type),
        ),
        Step::Build => (Status::Building, config.build_dir.display().to_string()),
        Step::Test => (Status::Testing, config.build_dir.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_status_words() {
        let config = OrchestratorConfig::new("/src", "/src/build");

        let (status, target) = step_status(Step::Configure, &config);
        assert_eq!(status, Status::Configuring);
        assert_eq!(target, "/src (Debug)");

        assert_eq!(step_status(Step::Build, &config).0, Status::Building);
        let (status, target) = step_status(Step::Test, &config);
        assert_eq!(status, Status::Testing);
        assert_eq!(target, "/src/build");
    }
}
