use crate::model::BuildMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Derive deployment artifacts and a container build model from a program
#[derive(Parser, Debug)]
#[command(
    name = "c2c",
    about = "Derive deployment artifacts and a container build model from a program",
    version,
    author,
    long_about = "c2c reads the structural model of a program (as JSON), extracts its service \
                  topology, layers the project configuration (Cloud.toml) and C2C_* environment \
                  overrides over built-in defaults and synthesizes workload, endpoint, secret, \
                  config map and autoscaler models together with diagnostics."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate the artifact graph and build model",
        long_about = "Runs the full pipeline and prints the artifact graph, the container build \
                      model and all diagnostics.\n\n\
                      Examples:\n  \
                      c2c generate program.json\n  \
                      c2c generate program.json --config Cloud.toml --format json\n  \
                      c2c generate program.json --mode task -o artifacts.yaml"
    )]
    Generate(BuildArgs),

    #[command(
        about = "Report diagnostics only",
        long_about = "Runs the full pipeline but prints only the diagnostics.\n\n\
                      Examples:\n  \
                      c2c validate program.json\n  \
                      c2c validate program.json --mode single-service"
    )]
    Validate(BuildArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(value_name = "PROGRAM", help = "Program model as JSON")]
    pub program: PathBuf,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "Project configuration (defaults to Cloud.toml in the project directory)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Base directory for mount and copy files (defaults to the program's directory)"
    )]
    pub project_dir: Option<PathBuf>,

    #[arg(short = 'm', long, value_enum, default_value = "standard", help = "Build mode")]
    pub mode: BuildModeArg,

    #[arg(short = 'f', long, value_enum, default_value = "yaml", help = "Output format")]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

impl BuildArgs {
    pub fn project_dir(&self) -> PathBuf {
        if let Some(dir) = &self.project_dir {
            return dir.clone();
        }
        match self.program.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildModeArg {
    Standard,
    SingleService,
    #[value(alias = "task")]
    ScheduledTask,
}

impl From<BuildModeArg> for BuildMode {
    fn from(arg: BuildModeArg) -> Self {
        match arg {
            BuildModeArg::Standard => BuildMode::Standard,
            BuildModeArg::SingleService => BuildMode::SingleService,
            BuildModeArg::ScheduledTask => BuildMode::ScheduledTask,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
