use crate::config::MountKind;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::synthesis::{ArtifactGraph, ArtifactKind};
use std::collections::HashSet;

/// A check over a synthesized graph. Rules may drop offending artifacts.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, graph: &mut ArtifactGraph) -> Vec<Diagnostic>;
}

/// Artifacts of one kind must have distinct names; later duplicates are removed
pub struct UniqueArtifactNamesRule;

impl ValidationRule for UniqueArtifactNamesRule {
    fn name(&self) -> &'static str {
        "UniqueArtifactNames"
    }

    fn validate(&self, graph: &mut ArtifactGraph) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let mut report = |kind: ArtifactKind, name: &str| {
            diagnostics.push(Diagnostic::error(
                DiagnosticCode::DuplicateArtifactName,
                format!("duplicate {} name '{}'", kind, name),
            ));
        };

        let mut seen = HashSet::new();
        graph.endpoints.retain(|e| {
            let fresh = seen.insert(e.name.clone());
            if !fresh {
                report(ArtifactKind::Endpoint, &e.name);
            }
            fresh
        });

        let mut removed_mounts = Vec::new();
        for (kind, mount_kind, entries) in [
            (ArtifactKind::Secret, MountKind::Secret, &mut graph.secrets),
            (ArtifactKind::ConfigMap, MountKind::Config, &mut graph.config_maps),
        ] {
            let mut seen = HashSet::new();
            entries.retain(|m| {
                let fresh = seen.insert(m.name.clone());
                if !fresh {
                    report(kind, &m.name);
                    removed_mounts.push((mount_kind, m.mount_path.clone()));
                }
                fresh
            });
        }

        // Volumes of dropped secrets and config maps go with them.
        graph
            .runnable
            .volume_mounts_mut()
            .retain(|v| !removed_mounts.contains(&(v.kind, v.mount_path.clone())));

        diagnostics
    }
}

/// The workload image must have a name
pub struct NonEmptyImageRule;

impl ValidationRule for NonEmptyImageRule {
    fn name(&self) -> &'static str {
        "NonEmptyImage"
    }

    fn validate(&self, graph: &mut ArtifactGraph) -> Vec<Diagnostic> {
        let image = graph.runnable.image();
        if image.is_empty() || image.starts_with(':') || image.contains("/:") {
            vec![Diagnostic::error(
                DiagnosticCode::EmptyImageName,
                format!("{} has an empty image name", graph.runnable.name()),
            )]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentBlob, ResourceRequirements, Resources};
    use crate::synthesis::{MountedData, NetworkEndpointModel, Runnable, VolumeMount, WorkloadModel};
    use crate::topology::Transport;
    use std::collections::BTreeMap;

    fn mounted(name: &str, mount_path: &str) -> MountedData {
        MountedData {
            name: name.to_string(),
            mount_path: mount_path.to_string(),
            data: BTreeMap::from([("k".to_string(), ContentBlob::Text("v".to_string()))]),
            read_only: true,
        }
    }

    fn volume(source: &str, mount_path: &str) -> VolumeMount {
        VolumeMount {
            source: source.to_string(),
            kind: MountKind::Config,
            mount_path: mount_path.to_string(),
            read_only: true,
        }
    }

    fn graph(image: &str) -> ArtifactGraph {
        let resources = Resources {
            cpu: "200m".to_string(),
            memory: "100Mi".to_string(),
        };
        ArtifactGraph {
            runnable: Runnable::Deployment(WorkloadModel {
                name: "hello-deployment".to_string(),
                image: image.to_string(),
                replicas: 1,
                ports: vec![],
                env: BTreeMap::new(),
                liveness: None,
                readiness: None,
                volume_mounts: vec![
                    volume("app-config-map", "/etc/a"),
                    volume("app-config-map", "/etc/b"),
                ],
                resources: ResourceRequirements {
                    requests: resources.clone(),
                    limits: resources,
                },
            }),
            endpoints: vec![],
            secrets: vec![],
            config_maps: vec![
                mounted("app-config-map", "/etc/a"),
                mounted("app-config-map", "/etc/b"),
            ],
            autoscaler: None,
        }
    }

    #[test]
    fn test_duplicate_config_map_removed() {
        let mut graph = graph("hello:latest");
        let diagnostics = UniqueArtifactNamesRule.validate(&mut graph);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateArtifactName);
        assert_eq!(graph.config_maps.len(), 1);
        assert_eq!(graph.config_maps[0].mount_path, "/etc/a");
        assert_eq!(graph.runnable.volume_mounts().len(), 1);
    }

    #[test]
    fn test_duplicate_endpoint_removed() {
        let mut graph = graph("hello:latest");
        graph.config_maps.truncate(1);
        let endpoint = |port| NetworkEndpointModel {
            name: "hello-svc".to_string(),
            port,
            target_port: port,
            protocol: Transport::Tcp,
            service_paths: vec!["/hello".to_string()],
        };
        graph.endpoints = vec![endpoint(80), endpoint(81)];

        let diagnostics = UniqueArtifactNamesRule.validate(&mut graph);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(graph.endpoints.len(), 1);
        assert_eq!(graph.endpoints[0].port, 80);
    }

    #[test]
    fn test_same_name_different_kind_is_fine() {
        let mut graph = graph("hello:latest");
        graph.config_maps.truncate(1);
        graph.secrets = vec![mounted("app-config-map", "/etc/secret")];

        assert!(UniqueArtifactNamesRule.validate(&mut graph).is_empty());
    }

    #[test]
    fn test_empty_image() {
        assert_eq!(NonEmptyImageRule.validate(&mut graph(":latest")).len(), 1);
        assert_eq!(NonEmptyImageRule.validate(&mut graph("docker.io/acme/:v1")).len(), 1);
        assert!(NonEmptyImageRule.validate(&mut graph("hello:latest")).is_empty());
    }
}
