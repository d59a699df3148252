//! Configuration resolver - overlays the configuration layers and loads file content
//!
//! This is the only component that touches the disk during a build. Every mount
//! source and every secure-socket file is read once, through the injected
//! [`FileSystem`], and embedded as a [`ContentBlob`]. A failed read only drops
//! the affected mount or secret.

use super::content::ContentBlob;
use super::env::EnvOverrides;
use super::layer::{
    is_reserved_path, AutoscalingConfig, ConfigLayer, CopyFileSpec, DeploymentConfig,
    ImageCoordinates, MountSpec, ResolvedMount, ResourceRequirements, Resources,
    DEFAULT_AUTOSCALING_CPU, DEFAULT_BASE_IMAGE, DEFAULT_IMAGE_TAG, DEFAULT_LIMIT_CPU,
    DEFAULT_LIMIT_MEMORY, DEFAULT_REPLICAS, DEFAULT_REQUEST_CPU, DEFAULT_REQUEST_MEMORY,
};
use super::project::ProjectConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::fs::FileSystem;
use crate::model::ProgramModel;
use crate::topology::Topology;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Secure-socket file content keyed by the path as written in the program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialStore {
    files: BTreeMap<String, ContentBlob>,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: ContentBlob) {
        self.files.insert(path.into(), content);
    }

    pub fn get(&self, path: &str) -> Option<&ContentBlob> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Everything the synthesizer needs besides the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub deployment: DeploymentConfig,
    pub materials: MaterialStore,
}

pub struct ConfigResolver<F: FileSystem> {
    fs: F,
    project_dir: PathBuf,
}

impl<F: FileSystem> ConfigResolver<F> {
    pub fn new(fs: F, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Resolve the full configuration for one program
    pub fn resolve_program(
        &self,
        program: &ProgramModel,
        project: Option<&ProjectConfig>,
        env: &EnvOverrides,
        topology: &Topology,
    ) -> (ResolvedConfig, Diagnostics) {
        let mut diagnostics = Diagnostics::new();

        let defaults = ConfigLayer::builtin(program);
        let project = project
            .map(|p| p.to_layer(&mut diagnostics))
            .unwrap_or_default();
        let env = env.to_layer(&mut diagnostics);

        let (deployment, resolve_diagnostics) = self.resolve(defaults, project, env);
        diagnostics.extend(resolve_diagnostics);

        let (materials, material_diagnostics) = self.load_materials(topology);
        diagnostics.extend(material_diagnostics);

        (
            ResolvedConfig {
                deployment,
                materials,
            },
            diagnostics,
        )
    }

    /// Overlay `defaults < project < env` and finalize
    pub fn resolve(
        &self,
        defaults: ConfigLayer,
        project: ConfigLayer,
        env: ConfigLayer,
    ) -> (DeploymentConfig, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let merged = defaults.overlay(project).overlay(env);

        let replicas = merged.replicas.unwrap_or(DEFAULT_REPLICAS);
        let resources = ResourceRequirements {
            requests: Resources {
                cpu: merged
                    .requests
                    .cpu
                    .unwrap_or_else(|| DEFAULT_REQUEST_CPU.to_string()),
                memory: merged
                    .requests
                    .memory
                    .unwrap_or_else(|| DEFAULT_REQUEST_MEMORY.to_string()),
            },
            limits: Resources {
                cpu: merged
                    .limits
                    .cpu
                    .unwrap_or_else(|| DEFAULT_LIMIT_CPU.to_string()),
                memory: merged
                    .limits
                    .memory
                    .unwrap_or_else(|| DEFAULT_LIMIT_MEMORY.to_string()),
            },
        };

        let image = ImageCoordinates {
            registry: merged.image.registry,
            name: merged.image.name.unwrap_or_default(),
            tag: merged
                .image
                .tag
                .unwrap_or_else(|| DEFAULT_IMAGE_TAG.to_string()),
            base: merged
                .image
                .base
                .unwrap_or_else(|| DEFAULT_BASE_IMAGE.to_string()),
            cmd: merged.image.cmd,
        };

        let min_replicas = merged.autoscaling.min_replicas.unwrap_or(replicas);
        let max_replicas = merged
            .autoscaling
            .max_replicas
            .unwrap_or(min_replicas.saturating_add(1));
        let mut enable = merged.autoscaling.enable.unwrap_or(true);
        if enable && max_replicas < min_replicas {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::InvalidAutoscaling,
                format!(
                    "autoscaling max_replicas {} is below min_replicas {}",
                    max_replicas, min_replicas
                ),
            ));
            enable = false;
        }
        let autoscaling = AutoscalingConfig {
            enable,
            min_replicas,
            max_replicas,
            cpu_percentage: merged.autoscaling.cpu.unwrap_or(DEFAULT_AUTOSCALING_CPU),
            memory_percentage: merged.autoscaling.memory,
        };

        let mounts = self.resolve_mounts(&merged.mounts, &mut diagnostics);
        let copy_files = self.check_copy_files(merged.copy_files, &mut diagnostics);

        let config = DeploymentConfig {
            replicas,
            resources,
            liveness: merged.liveness,
            readiness: merged.readiness,
            image,
            autoscaling,
            port_mappings: merged.port_mappings,
            schedule: merged.schedule,
            env: merged.env,
            mounts,
            copy_files,
        };

        info!(
            replicas = config.replicas,
            mounts = config.mounts.len(),
            image = %config.image.reference(),
            "Deployment configuration resolved"
        );

        (config, diagnostics)
    }

    /// Read every mount source and merge specs of the same kind sharing a mount path
    fn resolve_mounts(
        &self,
        specs: &[MountSpec],
        diagnostics: &mut Diagnostics,
    ) -> Vec<ResolvedMount> {
        let mut mounts: Vec<ResolvedMount> = Vec::new();

        for spec in specs {
            if is_reserved_path(&spec.mount_path) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::ReservedMountPath,
                    format!(
                        "mount path '{}' of '{}' is reserved",
                        spec.mount_path, spec.name
                    ),
                ));
                continue;
            }

            let content = match self.read(&spec.file) {
                Ok(content) => content,
                Err(err) => {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::UnreadableMountFile,
                        format!("unable to read '{}' for '{}': {}", spec.file, spec.name, err),
                    ));
                    continue;
                }
            };

            let key = file_name(&spec.file);
            let mount_path = spec.mount_path.trim_end_matches('/').to_string();

            let existing = mounts
                .iter_mut()
                .find(|m| m.kind == spec.kind && m.mount_path == mount_path);
            match existing {
                Some(mount) if mount.data.contains_key(&key) => {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::DuplicateMountKey,
                        format!("file '{}' is mounted twice at '{}'", key, mount_path),
                    ));
                }
                Some(mount) => {
                    debug!(name = %spec.name, mount_path = %mount_path, "Merged mount");
                    mount.data.insert(key, content);
                }
                None => {
                    debug!(name = %spec.name, mount_path = %mount_path, "Resolved mount");
                    mounts.push(ResolvedMount {
                        name: spec.name.clone(),
                        kind: spec.kind,
                        mount_path,
                        data: BTreeMap::from([(key, content)]),
                        read_only: true,
                    });
                }
            }
        }

        mounts
    }

    fn check_copy_files(
        &self,
        copy_files: Vec<CopyFileSpec>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<CopyFileSpec> {
        copy_files
            .into_iter()
            .filter(|copy| {
                if is_reserved_path(&copy.target) {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::ReservedMountPath,
                        format!("copy target '{}' of '{}' is reserved", copy.target, copy.name),
                    ));
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Read every secure-socket file referenced by an eligible service
    pub fn load_materials(&self, topology: &Topology) -> (MaterialStore, Diagnostics) {
        let mut store = MaterialStore::new();
        let mut diagnostics = Diagnostics::new();

        let paths = topology
            .eligible_services()
            .flat_map(|s| s.listeners.iter())
            .filter_map(|l| l.secure_socket.as_ref())
            .flat_map(|ssl| ssl.paths());

        for path in paths {
            if store.contains(path) {
                continue;
            }
            match self.read(path) {
                Ok(content) => {
                    debug!(path = %path, "Loaded secure socket file");
                    store.insert(path, content);
                }
                Err(err) => diagnostics.push(Diagnostic::error(
                    DiagnosticCode::UnreadableSecureSocketFile,
                    format!("unable to read secure socket file '{}': {}", path, err),
                )),
            }
        }

        (store, diagnostics)
    }

    fn read(&self, file: &str) -> anyhow::Result<ContentBlob> {
        let path = self.project_dir.join(file.trim_start_matches("./"));
        let bytes = self.fs.read(&path)?;
        Ok(ContentBlob::from_bytes(bytes))
    }
}

/// Data key for a mounted file
pub fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
