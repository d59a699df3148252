//! Artifact synthesizer - turns a topology plus resolved configuration into an artifact graph

use super::artifacts::{
    ArtifactGraph, AutoscalerModel, ContainerPort, JobModel, ProbeModel, Runnable, WorkloadModel,
};
use super::builder::{ArtifactGraphBuilder, MergeOutcome};
use super::naming::{artifact_name, Role};
use crate::config::layer::{is_reserved_path, APP_HOME};
use crate::config::resolver::file_name;
use crate::config::{MountKind, ProbeSpec, ResolvedConfig};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::model::{BuildMode, ProgramModel};
use crate::topology::{ListenerInfo, Schedule, ServiceInfo, Topology, Transport};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

pub struct ArtifactSynthesizer<'p> {
    program: &'p ProgramModel,
    mode: BuildMode,
}

impl<'p> ArtifactSynthesizer<'p> {
    pub fn new(program: &'p ProgramModel, mode: BuildMode) -> Self {
        Self { program, mode }
    }

    /// Job instead of workload when the mode asks for it, or the program only has tasks
    pub fn is_job(&self, topology: &Topology) -> bool {
        self.mode == BuildMode::ScheduledTask || topology.is_scheduled()
    }

    pub fn synthesize(
        &self,
        topology: &Topology,
        config: &ResolvedConfig,
    ) -> (ArtifactGraph, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut builder = ArtifactGraphBuilder::new();
        let deployment = &config.deployment;
        let is_job = self.is_job(topology);

        if !is_job {
            self.add_endpoints(&mut builder, topology, &deployment.port_mappings);
        }
        self.add_secure_socket_secrets(&mut builder, topology, config, &mut diagnostics);

        for mount in &deployment.mounts {
            let role = match mount.kind {
                MountKind::Secret => Role::Secret,
                MountKind::Config => Role::ConfigMap,
            };
            for (key, content) in &mount.data {
                let name = || artifact_name(&mount.name, role);
                let outcome = match mount.kind {
                    MountKind::Secret => {
                        builder.add_secret(name, &mount.mount_path, key.clone(), content.clone())
                    }
                    MountKind::Config => builder.add_config_map(
                        name,
                        &mount.mount_path,
                        key.clone(),
                        content.clone(),
                    ),
                };
                report_conflict(outcome, &mount.mount_path, &mut diagnostics);
            }
        }

        let volume_mounts = builder.volume_mounts();
        let image = deployment.image.reference();
        let runnable = if is_job {
            Runnable::Job(JobModel {
                name: artifact_name(&self.program.name, Role::Job),
                image,
                schedule: self.schedule(topology, deployment.schedule.as_deref(), &mut diagnostics),
                env: deployment.env.clone(),
                volume_mounts,
                resources: deployment.resources.clone(),
            })
        } else {
            let workload = WorkloadModel {
                name: artifact_name(&self.program.name, Role::Deployment),
                image,
                replicas: deployment.replicas,
                ports: container_ports(topology),
                env: deployment.env.clone(),
                liveness: deployment.liveness.as_ref().and_then(probe_model),
                readiness: deployment.readiness.as_ref().and_then(probe_model),
                volume_mounts,
                resources: deployment.resources.clone(),
            };
            if deployment.autoscaling.enable {
                builder.autoscaler(AutoscalerModel {
                    name: artifact_name(&self.program.name, Role::Autoscaler),
                    target: workload.name.clone(),
                    min_replicas: deployment.autoscaling.min_replicas,
                    max_replicas: deployment.autoscaling.max_replicas,
                    cpu_percentage: deployment.autoscaling.cpu_percentage,
                    memory_percentage: deployment.autoscaling.memory_percentage,
                });
            }
            Runnable::Deployment(workload)
        };

        let graph = builder.build(runnable);
        info!(
            runnable = %graph.runnable.name(),
            endpoints = graph.endpoints.len(),
            secrets = graph.secrets.len(),
            config_maps = graph.config_maps.len(),
            "Artifact graph synthesized"
        );
        (graph, diagnostics)
    }

    fn add_endpoints(
        &self,
        builder: &mut ArtifactGraphBuilder,
        topology: &Topology,
        port_mappings: &BTreeMap<u16, u16>,
    ) {
        let external = |port: u16| port_mappings.get(&port).copied().unwrap_or(port);
        let external_ports: BTreeSet<u16> = topology.ports().into_iter().map(external).collect();
        let single = external_ports.len() == 1;

        for service in topology.eligible_services() {
            for listener in &service.listeners {
                let port = external(listener.port);
                let name = || {
                    let base = self.base_name(service);
                    if single {
                        artifact_name(base, Role::Service)
                    } else {
                        artifact_name(&format!("{}-{}", base, port), Role::Service)
                    }
                };
                builder.add_endpoint(
                    name,
                    port,
                    listener.port,
                    listener.transport,
                    &service.service_path,
                );
            }
        }
    }

    fn add_secure_socket_secrets(
        &self,
        builder: &mut ArtifactGraphBuilder,
        topology: &Topology,
        config: &ResolvedConfig,
        diagnostics: &mut Diagnostics,
    ) {
        for service in topology.eligible_services() {
            for listener in &service.listeners {
                let Some(ssl) = &listener.secure_socket else {
                    continue;
                };
                let materials = [
                    (&ssl.cert_path, Role::SecureSocket),
                    (&ssl.key_path, Role::SecureSocket),
                    (&ssl.key_store_path, Role::KeyStore),
                    (&ssl.trust_path, Role::TrustStore),
                    (&ssl.mutual_ssl_cert_path, Role::MutualSsl),
                ];
                for (path, role) in materials {
                    let Some(path) = path.as_deref() else {
                        continue;
                    };
                    // Unreadable files were already reported by the resolver.
                    let Some(content) = config.materials.get(path) else {
                        continue;
                    };
                    let mount_path = secure_socket_mount_path(path);
                    if is_reserved_path(&mount_path) {
                        diagnostics.push(Diagnostic::error(
                            DiagnosticCode::ReservedMountPath,
                            format!(
                                "secure socket file '{}' would be mounted at reserved path '{}'",
                                path, mount_path
                            ),
                        ));
                        continue;
                    }
                    let name = || artifact_name(self.listener_base(service, listener), role);
                    let outcome =
                        builder.add_secret(name, &mount_path, file_name(path), content.clone());
                    debug!(
                        path = %path,
                        mount_path = %mount_path,
                        ?outcome,
                        "Secure socket material"
                    );
                    report_conflict(outcome, &mount_path, diagnostics);
                }
            }
        }
    }

    fn schedule(
        &self,
        topology: &Topology,
        configured: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        if let Some(expression) = configured {
            return match Schedule::parse(expression) {
                Ok(schedule) => Some(schedule.to_string()),
                Err(diagnostic) => {
                    diagnostics.push(diagnostic);
                    None
                }
            };
        }
        topology
            .tasks
            .iter()
            .find_map(|t| t.schedule.as_ref())
            .map(Schedule::to_string)
    }

    fn base_name<'a>(&'a self, service: &'a ServiceInfo) -> &'a str {
        service.base_name().unwrap_or(&self.program.name)
    }

    fn listener_base<'a>(
        &'a self,
        service: &'a ServiceInfo,
        listener: &'a ListenerInfo,
    ) -> &'a str {
        listener.name.as_deref().unwrap_or_else(|| self.base_name(service))
    }
}

/// Secure-socket files are mounted where the program expects them relative to its home
pub fn secure_socket_mount_path(path: &str) -> String {
    let parent = Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = parent.trim_start_matches("./").trim_end_matches('/');
    if parent.starts_with('/') {
        parent.to_string()
    } else if parent.is_empty() || parent == "." {
        format!("{}/secure-socket", APP_HOME)
    } else {
        format!("{}/{}", APP_HOME, parent)
    }
}

fn container_ports(topology: &Topology) -> Vec<ContainerPort> {
    topology
        .ports()
        .into_iter()
        .map(|port| {
            let protocol = topology
                .eligible_services()
                .find_map(|s| s.listener_on(port))
                .map(|l| l.transport)
                .unwrap_or(Transport::Tcp);
            ContainerPort {
                name: format!("port-{}", port),
                container_port: port,
                protocol,
            }
        })
        .collect()
}

fn probe_model(spec: &ProbeSpec) -> Option<ProbeModel> {
    Some(ProbeModel {
        port: spec.port?,
        path: spec.path.clone()?,
        initial_delay_seconds: spec.initial_delay_seconds,
        period_seconds: spec.period_seconds,
    })
}

fn report_conflict(outcome: MergeOutcome, mount_path: &str, diagnostics: &mut Diagnostics) {
    if let MergeOutcome::Conflict { name, key } = outcome {
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::DuplicateMountKey,
            format!(
                "'{}' at '{}' already holds a different '{}'",
                name, mount_path, key
            ),
        ));
    }
}
