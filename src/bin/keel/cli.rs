//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use keel::core::BuildType;
use keel::util::shell::ColorChoice;

/// Keel - configure, build and test CMake projects
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Defaults to `all` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build and run the tests
    All,

    /// Generate build files with CMake
    Configure,

    /// Configure and build the project
    Build,

    /// Run ctest in an existing build directory
    Test,

    /// Remove the build directory
    Clean,

    /// Check that CMake, CTest and a generator are installed
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Settings shared by every pipeline command.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Build directory (default: build)
    #[arg(long, global = true, env = "KEEL_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,

    /// CMake source directory (default: current directory)
    #[arg(long, global = true)]
    pub source_dir: Option<PathBuf>,

    /// Build type: Debug or Release
    #[arg(long, global = true, env = "KEEL_BUILD_TYPE", conflicts_with = "release")]
    pub build_type: Option<BuildType>,

    /// Shorthand for --build-type Release
    #[arg(short, long, global = true)]
    pub release: bool,

    /// CMake generator, e.g. "Ninja" (skips detection)
    #[arg(short = 'G', long, global = true, env = "KEEL_GENERATOR")]
    pub generator: Option<String>,

    /// Number of parallel build jobs
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Print the commands as JSON instead of running them
    #[arg(long, global = true)]
    pub plan: bool,
}

impl PipelineArgs {
    /// Build type requested on the command line, if any.
    pub fn build_type(&self) -> Option<BuildType> {
        if self.release {
            Some(BuildType::Release)
        } else {
            self.build_type
        }
    }
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
