//! Project configuration document (`Cloud.toml`)
//!
//! The document is optional. When present it is parsed with `toml` into the
//! section structs below and converted into a [`ConfigLayer`]. Unknown keys are
//! ignored so documents written for newer versions still load.
//!
//! ```toml
//! [container.image]
//! name = "hello"
//! tag = "v1.0.0"
//!
//! [deployment]
//! replicas = 2
//! min_memory = "150Mi"
//!
//! [deployment.probes.liveness]
//! port = 9090
//! path = "/helloWorld/live"
//!
//! [config.files.app]
//! file = "resources/app.properties"
//! mount_path = "/home/app/conf-extra"
//! ```

use super::layer::{
    checked_cpu, checked_memory, AutoscalingLayer, ConfigLayer, CopyFileSpec, ImageLayer,
    MountKind, MountSpec, ProbeSpec, ResourceQuantities,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::error::{C2cError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const PROJECT_CONFIG_FILE: &str = "Cloud.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub container: ContainerSection,
    pub deployment: DeploymentSection,
    pub config: ConfigSection,
    pub secret: SecretSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSection {
    pub image: ImageSection,
    pub copy: CopySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    pub registry: Option<String>,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub base: Option<String>,
    pub cmd: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopySection {
    pub files: BTreeMap<String, CopyFileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFileEntry {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSection {
    pub replicas: Option<u32>,
    pub min_cpu: Option<String>,
    pub max_cpu: Option<String>,
    pub min_memory: Option<String>,
    pub max_memory: Option<String>,
    /// Keys are listener ports written as strings, values the external port
    pub port_mappings: BTreeMap<String, u16>,
    pub autoscaling: AutoscalingSection,
    pub probes: ProbesSection,
    pub job: JobSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscalingSection {
    pub enable: Option<bool>,
    pub min_replicas: Option<u32>,
    pub max_replicas: Option<u32>,
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbesSection {
    pub liveness: Option<ProbeSpec>,
    pub readiness: Option<ProbeSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSection {
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSection {
    pub env: BTreeMap<String, String>,
    pub files: BTreeMap<String, MountEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSection {
    pub files: BTreeMap<String, MountEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountEntry {
    pub file: String,
    pub mount_path: String,
}

impl ProjectConfig {
    /// Parse a document; `path` is only used for error reporting
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| C2cError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| C2cError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        debug!(path = %path.display(), "Loaded project configuration");
        Ok(config)
    }

    /// Load `Cloud.toml` from a project directory if it exists
    pub fn discover(project_dir: &Path) -> Result<Option<Self>> {
        let path = project_dir.join(PROJECT_CONFIG_FILE);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            debug!(dir = %project_dir.display(), "No project configuration found");
            Ok(None)
        }
    }

    /// Convert to a layer, reporting malformed values
    pub fn to_layer(&self, diagnostics: &mut Diagnostics) -> ConfigLayer {
        let deployment = &self.deployment;

        let mut port_mappings = BTreeMap::new();
        for (key, external) in &deployment.port_mappings {
            match key.trim().parse::<u16>() {
                Ok(port) if port > 0 && *external > 0 => {
                    port_mappings.insert(port, *external);
                }
                _ => diagnostics.push(Diagnostic::error(
                    DiagnosticCode::InvalidPortMapping,
                    format!("invalid port mapping '{}' -> {}", key, external),
                )),
            }
        }

        let mut mounts = Vec::new();
        mounts.extend(mount_specs(&self.secret.files, MountKind::Secret));
        mounts.extend(mount_specs(&self.config.files, MountKind::Config));

        let copy_files = self
            .container
            .copy
            .files
            .iter()
            .map(|(name, entry)| CopyFileSpec {
                name: name.clone(),
                source: entry.source.clone(),
                target: entry.target.clone(),
            })
            .collect();

        let image = &self.container.image;
        let autoscaling = &deployment.autoscaling;

        ConfigLayer {
            replicas: deployment.replicas,
            requests: ResourceQuantities {
                cpu: checked_cpu(deployment.min_cpu.as_deref(), "min_cpu", diagnostics),
                memory: checked_memory(deployment.min_memory.as_deref(), "min_memory", diagnostics),
            },
            limits: ResourceQuantities {
                cpu: checked_cpu(deployment.max_cpu.as_deref(), "max_cpu", diagnostics),
                memory: checked_memory(deployment.max_memory.as_deref(), "max_memory", diagnostics),
            },
            liveness: deployment.probes.liveness.clone(),
            readiness: deployment.probes.readiness.clone(),
            image: ImageLayer {
                registry: image.registry.clone(),
                name: image.name.clone(),
                tag: image.tag.clone(),
                base: image.base.clone(),
                cmd: image.cmd.clone(),
            },
            autoscaling: AutoscalingLayer {
                enable: autoscaling.enable,
                min_replicas: autoscaling.min_replicas,
                max_replicas: autoscaling.max_replicas,
                cpu: autoscaling.cpu,
                memory: autoscaling.memory,
            },
            port_mappings,
            schedule: deployment.job.schedule.clone(),
            env: self.config.env.clone(),
            mounts,
            copy_files,
        }
    }
}

fn mount_specs(
    entries: &BTreeMap<String, MountEntry>,
    kind: MountKind,
) -> impl Iterator<Item = MountSpec> + '_ {
    entries.iter().map(move |(name, entry)| MountSpec {
        name: name.clone(),
        kind,
        file: entry.file.clone(),
        mount_path: entry.mount_path.clone(),
    })
}
