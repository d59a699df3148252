use crate::cli::commands::BuildArgs;
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::{EnvOverrides, ProjectConfig};
use crate::fs::RealFileSystem;
use crate::model::ProgramModel;
use crate::pipeline::PipelineOrchestrator;
use crate::progress::LoggingHandler;
use crate::session::{BuildOutput, BuildSession, SessionRegistry};
use crate::validation::Validator;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

pub fn handle_generate(args: &BuildArgs) -> i32 {
    run_command(args, |formatter, output| formatter.format(output))
}

pub fn handle_validate(args: &BuildArgs) -> i32 {
    run_command(args, |formatter, output| {
        formatter.format_diagnostics(&output.diagnostics)
    })
}

fn run_command<F>(args: &BuildArgs, render: F) -> i32
where
    F: Fn(&OutputFormatter, &BuildOutput) -> Result<String>,
{
    let result = build(args).and_then(|output| {
        let formatter = OutputFormatter::new(OutputFormat::from(args.format));
        let text = render(&formatter, &output)?;
        write_output(&text, args.output.as_deref())?;
        Ok(output.has_errors())
    });

    match result {
        Ok(false) => 0,
        Ok(true) => 1,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            2
        }
    }
}

/// Load inputs from disk and run the pipeline once
pub fn build(args: &BuildArgs) -> Result<BuildOutput> {
    let program = ProgramModel::load(&args.program)
        .with_context(|| format!("Failed to load program model {}", args.program.display()))?;

    let project_dir = args.project_dir();
    let project = match &args.config {
        Some(path) => Some(ProjectConfig::load(path)?),
        None => ProjectConfig::discover(&project_dir)?,
    };
    debug!(
        program = %program.identity(),
        project_dir = %project_dir.display(),
        has_project_config = project.is_some(),
        "Inputs loaded"
    );

    let mut session = BuildSession::new(program, args.mode.into())
        .with_env(EnvOverrides::from_process())
        .with_project_dir(project_dir);
    if let Some(project) = project {
        session = session.with_project(project);
    }

    let orchestrator =
        PipelineOrchestrator::new(Arc::new(RealFileSystem), Arc::new(Validator::new()))
            .with_progress(Arc::new(LoggingHandler));
    orchestrator.run(&mut SessionRegistry::new(), session)
}

fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
