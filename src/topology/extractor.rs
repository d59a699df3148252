//! Topology extractor - walks service declarations and binds them to resolved listeners

use super::listener::{ListenerInfo, ListenerResolver, Resolution};
use super::path::{normalize_service_path, resource_path};
use super::schedule::{Schedule, TaskInfo};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, SourceLocation};
use crate::model::{BuildMode, ProgramModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Request-handling entry point under a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Absolute path (service path + resource path)
    pub path: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service_path: String,
    pub module: String,
    pub listeners: Vec<ListenerInfo>,
    pub resources: Vec<ResourceInfo>,
    /// False when the build mode caps the number of deployable services
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl ServiceInfo {
    /// Last path segment, used as a naming base
    pub fn base_name(&self) -> Option<&str> {
        self.service_path.rsplit('/').find(|s| !s.is_empty())
    }

    pub fn listener_on(&self, port: u16) -> Option<&ListenerInfo> {
        self.listeners.iter().find(|l| l.port == port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Every discovered service, in module then declaration order
    pub services: Vec<ServiceInfo>,
    pub tasks: Vec<TaskInfo>,
}

impl Topology {
    pub fn eligible_services(&self) -> impl Iterator<Item = &ServiceInfo> {
        self.services.iter().filter(|s| s.eligible)
    }

    /// Distinct listener ports over eligible services, ascending
    pub fn ports(&self) -> BTreeSet<u16> {
        self.eligible_services()
            .flat_map(|s| s.listeners.iter().map(|l| l.port))
            .collect()
    }

    pub fn services_on(&self, port: u16) -> impl Iterator<Item = &ServiceInfo> {
        self.eligible_services()
            .filter(move |s| s.listener_on(port).is_some())
    }

    pub fn is_scheduled(&self) -> bool {
        !self.tasks.is_empty() && self.services.is_empty()
    }
}

pub struct TopologyExtractor {
    mode: BuildMode,
}

impl TopologyExtractor {
    pub fn new(mode: BuildMode) -> Self {
        Self { mode }
    }

    pub fn extract(&self, program: &ProgramModel) -> (Topology, Diagnostics) {
        let mut topology = Topology::default();
        let mut diagnostics = Diagnostics::new();

        for module in &program.modules {
            let resolver = ListenerResolver::new(module);

            for decl in &module.services {
                let service_path = normalize_service_path(&decl.base_path);
                let location = decl.location.as_ref();

                let mut listeners: Vec<ListenerInfo> = Vec::new();
                for expr in &decl.listeners {
                    match resolver.resolve(expr, location) {
                        Resolution::Resolved { listener, warning } => {
                            if let Some(warning) = warning {
                                diagnostics.push(warning);
                            }
                            if !listeners.contains(&listener) {
                                listeners.push(listener);
                            }
                        }
                        Resolution::Unresolved(diagnostic) => diagnostics.push(diagnostic),
                    }
                }

                let resources = decl
                    .resources
                    .iter()
                    .map(|r| ResourceInfo {
                        path: resource_path(&service_path, &r.path),
                        method: r.method.to_lowercase(),
                    })
                    .collect();

                let eligible = !self.mode.is_restricted() || topology.services.is_empty();
                if !eligible {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticCode::ServiceLimitExceeded,
                            format!(
                                "only one service is supported in this mode; '{}' is excluded",
                                service_path
                            ),
                        )
                        .at(location),
                    );
                }

                debug!(
                    module = %module.name,
                    path = %service_path,
                    listeners = listeners.len(),
                    eligible,
                    "Discovered service"
                );

                topology.services.push(ServiceInfo {
                    service_path,
                    module: module.name.clone(),
                    listeners,
                    resources,
                    eligible,
                    location: decl.location.clone(),
                });
            }

            for task in &module.tasks {
                let schedule = Schedule::from_task(task);
                let schedule = match schedule.validate() {
                    Ok(()) => Some(schedule),
                    Err(diagnostic) => {
                        diagnostics.push(diagnostic.at(task.location.as_ref()));
                        None
                    }
                };
                topology.tasks.push(TaskInfo {
                    name: task.name.clone(),
                    schedule,
                });
            }
        }

        info!(
            services = topology.services.len(),
            tasks = topology.tasks.len(),
            diagnostics = diagnostics.len(),
            "Topology extracted"
        );

        (topology, diagnostics)
    }
}
