//! Container image build model
//!
//! A single-stage description of how the program's executable is packaged:
//! base image, what gets copied where, exposed ports and the start command.

use crate::config::layer::APP_HOME;
use crate::config::DeploymentConfig;
use crate::model::ProgramModel;
use crate::topology::Topology;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyInstruction {
    /// Source path, relative to the project directory
    pub from: String,
    /// Destination inside the image
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildModel {
    pub base: String,
    /// Full reference of the image being built
    pub image: String,
    pub workdir: String,
    pub copy: Vec<CopyInstruction>,
    pub ports: Vec<u16>,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl BuildModel {
    /// Exposed ports are the distinct listener ports of eligible services, ascending
    pub fn from_config(
        program: &ProgramModel,
        topology: &Topology,
        config: &DeploymentConfig,
    ) -> Self {
        let mut copy = Vec::new();
        let mut installed = None;

        if let Some(executable) = program.executable.as_deref() {
            let file = Path::new(executable)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| executable.to_string());
            let target = format!("{}/{}", APP_HOME, file);
            copy.push(CopyInstruction {
                from: executable.to_string(),
                to: target.clone(),
            });
            installed = Some(target);
        }

        copy.extend(config.copy_files.iter().map(|c| CopyInstruction {
            from: c.source.clone(),
            to: c.target.clone(),
        }));

        let command = match (&config.image.cmd, installed) {
            (Some(cmd), _) => cmd.clone(),
            (None, Some(target)) if target.ends_with(".jar") => {
                vec!["java".to_string(), "-jar".to_string(), target]
            }
            (None, Some(target)) => vec![target],
            (None, None) => Vec::new(),
        };

        Self {
            base: config.image.base.clone(),
            image: config.image.reference(),
            workdir: APP_HOME.to_string(),
            copy,
            ports: topology.ports().into_iter().collect(),
            command,
            env: config.env.clone(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize BuildModel to YAML")
    }
}

impl fmt::Display for BuildModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image: {}", self.image)?;
        writeln!(f, "  Base Image: {}", self.base)?;
        writeln!(f, "  Workdir:    {}", self.workdir)?;
        if !self.copy.is_empty() {
            writeln!(f, "  Copy:")?;
            for c in &self.copy {
                writeln!(f, "    - {} -> {}", c.from, c.to)?;
            }
        }
        if !self.command.is_empty() {
            writeln!(f, "  Command:    {}", self.command.join(" "))?;
        }
        if !self.ports.is_empty() {
            let ports = self
                .ports
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "  Ports:      {}", ports)?;
        }
        Ok(())
    }
}
