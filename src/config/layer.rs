//! Layered deployment configuration
//!
//! Each source (built-in defaults, the project document, environment overrides)
//! is first turned into a [`ConfigLayer`] where every value is optional. Layers
//! are overlaid left to right, the rightmost present value winning, and the
//! result is finalized into a [`DeploymentConfig`].

use super::content::ContentBlob;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::model::ProgramModel;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const DEFAULT_REPLICAS: u32 = 1;
pub const DEFAULT_REQUEST_CPU: &str = "200m";
pub const DEFAULT_REQUEST_MEMORY: &str = "100Mi";
pub const DEFAULT_LIMIT_CPU: &str = "500m";
pub const DEFAULT_LIMIT_MEMORY: &str = "256Mi";
pub const DEFAULT_BASE_IMAGE: &str = "eclipse-temurin:17-jre";
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_AUTOSCALING_CPU: u32 = 50;

/// Program installation root inside the container
pub const APP_HOME: &str = "/home/app";
/// Runtime root inside the container
pub const RUNTIME_ROOT: &str = "/home/app/runtime";
/// Mount path reserved for the program's own configuration
pub const CONFIG_MOUNT_PATH: &str = "/home/app/conf";

pub fn is_reserved_path(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    [APP_HOME, RUNTIME_ROOT, CONFIG_MOUNT_PATH].contains(&trimmed)
}

fn cpu_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+)?m?$").expect("cpu pattern is valid"))
}

fn memory_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d+(\.\d+)?(Ki|Mi|Gi|Ti|K|M|G|T)?$").expect("memory pattern is valid")
    })
}

/// Keeps a quantity only if it is well formed, reporting it otherwise
pub fn checked_cpu(
    value: Option<&str>,
    field: &str,
    diagnostics: &mut crate::diagnostics::Diagnostics,
) -> Option<String> {
    checked_quantity(value, field, cpu_pattern(), diagnostics)
}

pub fn checked_memory(
    value: Option<&str>,
    field: &str,
    diagnostics: &mut crate::diagnostics::Diagnostics,
) -> Option<String> {
    checked_quantity(value, field, memory_pattern(), diagnostics)
}

fn checked_quantity(
    value: Option<&str>,
    field: &str,
    pattern: &Regex,
    diagnostics: &mut crate::diagnostics::Diagnostics,
) -> Option<String> {
    let value = value?.trim();
    if pattern.is_match(value) {
        Some(value.to_string())
    } else {
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::InvalidResourceQuantity,
            format!("invalid resource quantity '{}' for {}", value, field),
        ));
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

impl ResourceQuantities {
    fn overlay(self, top: ResourceQuantities) -> ResourceQuantities {
        ResourceQuantities {
            cpu: top.cpu.or(self.cpu),
            memory: top.memory.or(self.memory),
        }
    }
}

/// Health-check probe as configured; both fields are required to be usable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<u32>,
}

impl ProbeSpec {
    pub fn new(port: u16, path: impl Into<String>) -> Self {
        Self {
            port: Some(port),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    fn overlay(self, top: ProbeSpec) -> ProbeSpec {
        ProbeSpec {
            port: top.port.or(self.port),
            path: top.path.or(self.path),
            initial_delay_seconds: top.initial_delay_seconds.or(self.initial_delay_seconds),
            period_seconds: top.period_seconds.or(self.period_seconds),
        }
    }
}

fn overlay_probe(base: Option<ProbeSpec>, top: Option<ProbeSpec>) -> Option<ProbeSpec> {
    match (base, top) {
        (Some(base), Some(top)) => Some(base.overlay(top)),
        (base, top) => top.or(base),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    Secret,
    Config,
}

/// A single source file to be mounted into the workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    /// Logical name from the configuration document
    pub name: String,
    pub kind: MountKind,
    /// Source path, relative to the project directory
    pub file: String,
    pub mount_path: String,
}

/// Extra file copied into the container image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFileSpec {
    pub name: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLayer {
    pub registry: Option<String>,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub base: Option<String>,
    pub cmd: Option<Vec<String>>,
}

impl ImageLayer {
    fn overlay(self, top: ImageLayer) -> ImageLayer {
        ImageLayer {
            registry: top.registry.or(self.registry),
            name: top.name.or(self.name),
            tag: top.tag.or(self.tag),
            base: top.base.or(self.base),
            cmd: top.cmd.or(self.cmd),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoscalingLayer {
    pub enable: Option<bool>,
    pub min_replicas: Option<u32>,
    pub max_replicas: Option<u32>,
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
}

impl AutoscalingLayer {
    fn overlay(self, top: AutoscalingLayer) -> AutoscalingLayer {
        AutoscalingLayer {
            enable: top.enable.or(self.enable),
            min_replicas: top.min_replicas.or(self.min_replicas),
            max_replicas: top.max_replicas.or(self.max_replicas),
            cpu: top.cpu.or(self.cpu),
            memory: top.memory.or(self.memory),
        }
    }
}

/// One configuration source with every value optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub replicas: Option<u32>,
    pub requests: ResourceQuantities,
    pub limits: ResourceQuantities,
    pub liveness: Option<ProbeSpec>,
    pub readiness: Option<ProbeSpec>,
    pub image: ImageLayer,
    pub autoscaling: AutoscalingLayer,
    /// Listener port -> externally exposed port
    pub port_mappings: BTreeMap<u16, u16>,
    pub schedule: Option<String>,
    pub env: BTreeMap<String, String>,
    pub mounts: Vec<MountSpec>,
    pub copy_files: Vec<CopyFileSpec>,
}

impl ConfigLayer {
    /// Compiled-in defaults for a program
    pub fn builtin(program: &ProgramModel) -> Self {
        Self {
            replicas: Some(DEFAULT_REPLICAS),
            requests: ResourceQuantities {
                cpu: Some(DEFAULT_REQUEST_CPU.to_string()),
                memory: Some(DEFAULT_REQUEST_MEMORY.to_string()),
            },
            limits: ResourceQuantities {
                cpu: Some(DEFAULT_LIMIT_CPU.to_string()),
                memory: Some(DEFAULT_LIMIT_MEMORY.to_string()),
            },
            image: ImageLayer {
                name: Some(program.name.clone()),
                tag: Some(
                    program
                        .version
                        .clone()
                        .unwrap_or_else(|| DEFAULT_IMAGE_TAG.to_string()),
                ),
                base: Some(DEFAULT_BASE_IMAGE.to_string()),
                ..Default::default()
            },
            autoscaling: AutoscalingLayer {
                enable: Some(true),
                cpu: Some(DEFAULT_AUTOSCALING_CPU),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Overlays `top` onto `self`; scalar values from `top` win, collections accumulate
    pub fn overlay(self, top: ConfigLayer) -> ConfigLayer {
        let mut env = self.env;
        env.extend(top.env);
        let mut port_mappings = self.port_mappings;
        port_mappings.extend(top.port_mappings);
        let mut mounts = self.mounts;
        mounts.extend(top.mounts);
        let mut copy_files = self.copy_files;
        copy_files.extend(top.copy_files);

        ConfigLayer {
            replicas: top.replicas.or(self.replicas),
            requests: self.requests.overlay(top.requests),
            limits: self.limits.overlay(top.limits),
            liveness: overlay_probe(self.liveness, top.liveness),
            readiness: overlay_probe(self.readiness, top.readiness),
            image: self.image.overlay(top.image),
            autoscaling: self.autoscaling.overlay(top.autoscaling),
            port_mappings,
            schedule: top.schedule.or(self.schedule),
            env,
            mounts,
            copy_files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub requests: Resources,
    pub limits: Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCoordinates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    pub name: String,
    pub tag: String,
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
}

impl ImageCoordinates {
    /// Full image reference, e.g. `docker.io/acme/hello:1.0.0`
    pub fn reference(&self) -> String {
        match self.registry.as_deref().map(|r| r.trim_end_matches('/')) {
            Some(registry) if !registry.is_empty() => {
                format!("{}/{}:{}", registry, self.name, self.tag)
            }
            _ => format!("{}:{}", self.name, self.tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalingConfig {
    pub enable: bool,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_percentage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_percentage: Option<u32>,
}

/// A mount whose sources have been read, possibly merged from several specs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMount {
    pub name: String,
    pub kind: MountKind,
    pub mount_path: String,
    /// File name -> content
    pub data: BTreeMap<String, ContentBlob>,
    pub read_only: bool,
}

/// Fully resolved deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub replicas: u32,
    pub resources: ResourceRequirements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<ProbeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ProbeSpec>,
    pub image: ImageCoordinates,
    pub autoscaling: AutoscalingConfig,
    pub port_mappings: BTreeMap<u16, u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub env: BTreeMap<String, String>,
    pub mounts: Vec<ResolvedMount>,
    pub copy_files: Vec<CopyFileSpec>,
}

impl DeploymentConfig {
    pub fn probes(&self) -> impl Iterator<Item = (ProbeKind, &ProbeSpec)> {
        [
            (ProbeKind::Liveness, self.liveness.as_ref()),
            (ProbeKind::Readiness, self.readiness.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, spec)| spec.map(|s| (kind, s)))
    }

    pub fn mounts_of(&self, kind: MountKind) -> impl Iterator<Item = &ResolvedMount> {
        self.mounts.iter().filter(move |m| m.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Liveness,
    Readiness,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeKind::Liveness => write!(f, "liveness"),
            ProbeKind::Readiness => write!(f, "readiness"),
        }
    }
}
