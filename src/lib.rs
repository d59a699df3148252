//! c2c - deployment artifacts from a program's service topology
//!
//! Given the structural model of a program (modules, listener declarations,
//! services, resources and scheduled tasks) this library extracts the network
//! topology, layers project configuration and environment overrides over
//! built-in defaults and synthesizes a renderer-neutral graph of deployment
//! artifacts together with a container image build model.
//!
//! # Example Usage
//!
//! ```no_run
//! use c2c::{BuildSession, PipelineOrchestrator, ProgramModel, SessionRegistry};
//! use c2c::model::BuildMode;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let program = ProgramModel::load(Path::new("program.json"))?;
//! let session = BuildSession::new(program, BuildMode::Standard);
//!
//! let output = PipelineOrchestrator::default().run(&mut SessionRegistry::new(), session)?;
//! for (kind, name) in output.graph.names() {
//!     println!("{}: {}", kind, name);
//! }
//! for diagnostic in output.diagnostics.iter() {
//!     eprintln!("{}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`model`]: program structural model handed over by the host
//! - [`topology`]: listener resolution and topology extraction
//! - [`config`]: layered deployment configuration
//! - [`synthesis`]: artifact graph and image build model
//! - [`validation`]: probe checks and graph rules
//! - [`pipeline`]: phase orchestration over a [`BuildSession`]

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod synthesis;
pub mod topology;
pub mod util;
pub mod validation;

pub use config::{ConfigResolver, DeploymentConfig, EnvOverrides, ProjectConfig, ResolvedConfig};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use error::C2cError;
pub use model::{BuildMode, ProgramModel};
pub use pipeline::PipelineOrchestrator;
pub use session::{BuildOutput, BuildSession, SessionRegistry};
pub use synthesis::{ArtifactGraph, ArtifactSynthesizer, BuildModel};
pub use topology::{Topology, TopologyExtractor};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use validation::{ProbeValidator, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_c2c() {
        assert_eq!(NAME, "c2c");
    }
}
