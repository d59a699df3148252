//! Artifact graph data structures
//!
//! These are renderer-neutral descriptions of what gets deployed. A renderer
//! turns them into orchestrator manifests; this crate only dumps them with serde.

use crate::config::{ContentBlob, MountKind, ResourceRequirements};
use crate::topology::Transport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
    pub protocol: Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeModel {
    pub port: u16,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<u32>,
}

/// Volume of a workload backed by a secret or config map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Name of the backing secret or config map
    pub source: String,
    pub kind: MountKind,
    pub mount_path: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadModel {
    pub name: String,
    pub image: String,
    pub replicas: u32,
    pub ports: Vec<ContainerPort>,
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<ProbeModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ProbeModel>,
    pub volume_mounts: Vec<VolumeMount>,
    pub resources: ResourceRequirements,
}

/// Replaces the workload for programs that run on a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobModel {
    pub name: String,
    pub image: String,
    /// Five-field cron expression; absent when none was declared or it was invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub env: BTreeMap<String, String>,
    pub volume_mounts: Vec<VolumeMount>,
    pub resources: ResourceRequirements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Runnable {
    Deployment(WorkloadModel),
    Job(JobModel),
}

impl Runnable {
    pub fn name(&self) -> &str {
        match self {
            Runnable::Deployment(w) => &w.name,
            Runnable::Job(j) => &j.name,
        }
    }

    pub fn image(&self) -> &str {
        match self {
            Runnable::Deployment(w) => &w.image,
            Runnable::Job(j) => &j.image,
        }
    }

    pub fn volume_mounts(&self) -> &[VolumeMount] {
        match self {
            Runnable::Deployment(w) => &w.volume_mounts,
            Runnable::Job(j) => &j.volume_mounts,
        }
    }

    pub fn volume_mounts_mut(&mut self) -> &mut Vec<VolumeMount> {
        match self {
            Runnable::Deployment(w) => &mut w.volume_mounts,
            Runnable::Job(j) => &mut j.volume_mounts,
        }
    }

    pub fn as_workload(&self) -> Option<&WorkloadModel> {
        match self {
            Runnable::Deployment(w) => Some(w),
            Runnable::Job(_) => None,
        }
    }

    pub fn as_job(&self) -> Option<&JobModel> {
        match self {
            Runnable::Job(j) => Some(j),
            Runnable::Deployment(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEndpointModel {
    pub name: String,
    /// Externally exposed port
    pub port: u16,
    /// Listener port inside the container
    pub target_port: u16,
    pub protocol: Transport,
    /// Services reachable through this endpoint, in declaration order
    pub service_paths: Vec<String>,
}

/// Shared shape of secrets and config maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountedData {
    pub name: String,
    pub mount_path: String,
    pub data: BTreeMap<String, ContentBlob>,
    pub read_only: bool,
}

pub type SecretModel = MountedData;
pub type ConfigMapModel = MountedData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalerModel {
    pub name: String,
    /// Name of the scaled workload
    pub target: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cpu_percentage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_percentage: Option<u32>,
}

/// Artifact categories that share a name space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Runnable,
    Endpoint,
    Secret,
    ConfigMap,
    Autoscaler,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArtifactKind::Runnable => "workload",
            ArtifactKind::Endpoint => "network endpoint",
            ArtifactKind::Secret => "secret",
            ArtifactKind::ConfigMap => "config map",
            ArtifactKind::Autoscaler => "autoscaler",
        };
        f.write_str(label)
    }
}

/// Complete set of synthesized deployment-model objects for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactGraph {
    pub runnable: Runnable,
    pub endpoints: Vec<NetworkEndpointModel>,
    pub secrets: Vec<SecretModel>,
    pub config_maps: Vec<ConfigMapModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaler: Option<AutoscalerModel>,
}

impl ArtifactGraph {
    pub fn workload(&self) -> Option<&WorkloadModel> {
        self.runnable.as_workload()
    }

    pub fn job(&self) -> Option<&JobModel> {
        self.runnable.as_job()
    }

    pub fn secret_at(&self, mount_path: &str) -> Option<&SecretModel> {
        self.secrets.iter().find(|s| s.mount_path == mount_path)
    }

    pub fn config_map_at(&self, mount_path: &str) -> Option<&ConfigMapModel> {
        self.config_maps.iter().find(|c| c.mount_path == mount_path)
    }

    pub fn endpoint_on(&self, port: u16) -> Option<&NetworkEndpointModel> {
        self.endpoints.iter().find(|e| e.port == port)
    }

    /// Every artifact name with its kind, in graph order
    pub fn names(&self) -> Vec<(ArtifactKind, &str)> {
        let mut names = vec![(ArtifactKind::Runnable, self.runnable.name())];
        names.extend(self.endpoints.iter().map(|e| (ArtifactKind::Endpoint, e.name.as_str())));
        names.extend(self.secrets.iter().map(|s| (ArtifactKind::Secret, s.name.as_str())));
        names.extend(
            self.config_maps
                .iter()
                .map(|c| (ArtifactKind::ConfigMap, c.name.as_str())),
        );
        names.extend(
            self.autoscaler
                .iter()
                .map(|a| (ArtifactKind::Autoscaler, a.name.as_str())),
        );
        names
    }

    pub fn artifact_count(&self) -> usize {
        self.names().len()
    }
}
