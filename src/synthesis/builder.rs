//! Artifact graph builder
//!
//! The synthesizer feeds contributions in topology order; the builder applies
//! the merge rules (endpoints by external port, secrets and config maps by mount
//! path) and is consumed by [`ArtifactGraphBuilder::build`].

use super::artifacts::{
    ArtifactGraph, AutoscalerModel, MountedData, NetworkEndpointModel, Runnable, VolumeMount,
};
use crate::config::{ContentBlob, MountKind};
use crate::topology::Transport;
use std::collections::BTreeMap;
use tracing::debug;

/// Result of adding one file to a secret or config map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Merged,
    /// Same key and same content already present
    Unchanged,
    /// Same key with different content; the new content was not added
    Conflict { name: String, key: String },
}

#[derive(Debug, Default)]
pub struct ArtifactGraphBuilder {
    endpoints: BTreeMap<u16, NetworkEndpointModel>,
    secrets: Vec<MountedData>,
    config_maps: Vec<MountedData>,
    autoscaler: Option<AutoscalerModel>,
}

impl ArtifactGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the endpoint for `port` or add `service_path` to it
    pub fn add_endpoint(
        &mut self,
        name: impl FnOnce() -> String,
        port: u16,
        target_port: u16,
        protocol: Transport,
        service_path: &str,
    ) {
        let endpoint = self.endpoints.entry(port).or_insert_with(|| {
            let name = name();
            debug!(name = %name, port, target_port, "Created network endpoint");
            NetworkEndpointModel {
                name,
                port,
                target_port,
                protocol,
                service_paths: Vec::new(),
            }
        });
        if !endpoint.service_paths.iter().any(|p| p == service_path) {
            endpoint.service_paths.push(service_path.to_string());
        }
    }

    pub fn add_secret(
        &mut self,
        name: impl FnOnce() -> String,
        mount_path: &str,
        key: String,
        content: ContentBlob,
    ) -> MergeOutcome {
        merge_into(&mut self.secrets, name, mount_path, key, content)
    }

    pub fn add_config_map(
        &mut self,
        name: impl FnOnce() -> String,
        mount_path: &str,
        key: String,
        content: ContentBlob,
    ) -> MergeOutcome {
        merge_into(&mut self.config_maps, name, mount_path, key, content)
    }

    pub fn autoscaler(&mut self, autoscaler: AutoscalerModel) {
        self.autoscaler = Some(autoscaler);
    }

    /// Volume mounts for every secret and config map added so far
    pub fn volume_mounts(&self) -> Vec<VolumeMount> {
        let secrets = self.secrets.iter().map(|s| (MountKind::Secret, s));
        let config_maps = self.config_maps.iter().map(|c| (MountKind::Config, c));
        secrets
            .chain(config_maps)
            .map(|(kind, data)| VolumeMount {
                source: data.name.clone(),
                kind,
                mount_path: data.mount_path.clone(),
                read_only: data.read_only,
            })
            .collect()
    }

    /// Finalize around the program's workload or job
    pub fn build(self, runnable: Runnable) -> ArtifactGraph {
        ArtifactGraph {
            runnable,
            endpoints: self.endpoints.into_values().collect(),
            secrets: self.secrets,
            config_maps: self.config_maps,
            autoscaler: self.autoscaler,
        }
    }
}

fn merge_into(
    entries: &mut Vec<MountedData>,
    name: impl FnOnce() -> String,
    mount_path: &str,
    key: String,
    content: ContentBlob,
) -> MergeOutcome {
    match entries.iter_mut().find(|e| e.mount_path == mount_path) {
        Some(existing) => match existing.data.get(&key) {
            Some(current) if *current == content => MergeOutcome::Unchanged,
            Some(_) => MergeOutcome::Conflict {
                name: existing.name.clone(),
                key,
            },
            None => {
                debug!(name = %existing.name, key = %key, "Merged into existing mount");
                existing.data.insert(key, content);
                MergeOutcome::Merged
            }
        },
        None => {
            entries.push(MountedData {
                name: name(),
                mount_path: mount_path.to_string(),
                data: BTreeMap::from([(key, content)]),
                read_only: true,
            });
            MergeOutcome::Created
        }
    }
}
