//! Probe validator - checks configured health probes against the extracted topology
//!
//! Checks run in order and stop at the first failing stage for a probe:
//! required fields, port, service path, resource path. Liveness and readiness
//! are validated independently.

use crate::config::{ProbeKind, ProbeSpec};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::topology::path::{is_under, normalize};
use crate::topology::{ServiceInfo, Topology};

pub struct ProbeValidator<'t> {
    topology: &'t Topology,
}

impl<'t> ProbeValidator<'t> {
    pub fn new(topology: &'t Topology) -> Self {
        Self { topology }
    }

    pub fn validate<'p, I>(&self, probes: I) -> Diagnostics
    where
        I: IntoIterator<Item = (ProbeKind, &'p ProbeSpec)>,
    {
        let mut diagnostics = Diagnostics::new();
        for (kind, spec) in probes {
            if let Err(found) = self.validate_probe(kind, spec) {
                for diagnostic in found {
                    diagnostics.push(diagnostic);
                }
            }
        }
        diagnostics
    }

    fn validate_probe(&self, kind: ProbeKind, spec: &ProbeSpec) -> Result<(), Vec<Diagnostic>> {
        let (port, path) = match (spec.port, spec.path.as_deref()) {
            (Some(port), Some(path)) => (port, normalize(path)),
            (port, path) => {
                let missing: Vec<&str> = [("port", port.is_none()), ("path", path.is_none())]
                    .into_iter()
                    .filter_map(|(field, absent)| absent.then_some(field))
                    .collect();
                return Err(vec![Diagnostic::error(
                    DiagnosticCode::ProbeMissingField,
                    format!("{} probe is missing '{}'", kind, missing.join("' and '")),
                )]);
            }
        };

        let services: Vec<&ServiceInfo> = self.topology.services_on(port).collect();
        if services.is_empty() {
            return Err(vec![
                Diagnostic::error(
                    DiagnosticCode::InvalidProbePort,
                    format!("invalid {} probe port {}: no listener is bound to it", kind, port),
                ),
                Diagnostic::error(
                    DiagnosticCode::InvalidProbePath,
                    format!("invalid {} probe path '{}' on port {}", kind, path, port),
                ),
            ]);
        }

        let under: Vec<&ServiceInfo> = services
            .into_iter()
            .filter(|s| is_under(&s.service_path, &path))
            .collect();
        if under.is_empty() {
            return Err(vec![Diagnostic::error(
                DiagnosticCode::InvalidProbeServicePath,
                format!(
                    "invalid {} probe service path: '{}' is not under any service on port {}",
                    kind, path, port
                ),
            )]);
        }

        let has_resource = under
            .iter()
            .flat_map(|s| s.resources.iter())
            .any(|r| r.path == path);
        if !has_resource {
            return Err(vec![Diagnostic::error(
                DiagnosticCode::InvalidProbeResourcePath,
                format!(
                    "invalid {} probe resource path: no resource handles '{}'",
                    kind, path
                ),
            )]);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arg, BuildMode, Expr, ModuleModel, ProgramModel, ServiceDecl};
    use crate::topology::TopologyExtractor;
    use yare::parameterized;

    fn topology() -> Topology {
        let http = |port| {
            Expr::new_listener(Some("http:Listener"), vec![Arg::positional(Expr::int(port))])
        };
        let program = ProgramModel::new("hello").with_module(
            ModuleModel::new("main")
                .with_service(
                    ServiceDecl::new(&["/", "helloWorld"])
                        .with_listener(http(9090))
                        .with_resource("GET", &["data"])
                        .with_resource("GET", &["."]),
                )
                .with_service(
                    ServiceDecl::new(&["/", "admin"])
                        .with_listener(http(9091))
                        .with_resource("GET", &["health", "live"]),
                ),
        );
        TopologyExtractor::new(BuildMode::Standard).extract(&program).0
    }

    fn codes(diagnostics: &Diagnostics) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[parameterized(
        resource = { 9090, "/helloWorld/data" },
        service_root = { 9090, "/helloWorld" },
        trailing_slash = { 9090, "/helloWorld/data/" },
        nested = { 9091, "/admin/health/live" },
    )]
    fn test_valid_probe(port: u16, path: &str) {
        let topology = topology();
        let spec = ProbeSpec::new(port, path);
        let diagnostics = ProbeValidator::new(&topology).validate([(ProbeKind::Liveness, &spec)]);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_missing_resource() {
        let topology = topology();
        let spec = ProbeSpec::new(9090, "/helloWorld/missing");
        let diagnostics = ProbeValidator::new(&topology).validate([(ProbeKind::Readiness, &spec)]);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidProbeResourcePath]);
    }

    #[test]
    fn test_unknown_port_reports_port_and_path() {
        let topology = topology();
        let spec = ProbeSpec::new(8080, "/helloWorld/data");
        let diagnostics = ProbeValidator::new(&topology).validate([(ProbeKind::Liveness, &spec)]);
        assert_eq!(
            codes(&diagnostics),
            vec![DiagnosticCode::InvalidProbePort, DiagnosticCode::InvalidProbePath]
        );
    }

    #[test]
    fn test_path_outside_service() {
        let topology = topology();
        let spec = ProbeSpec::new(9090, "/helloWorldly/data");
        let diagnostics = ProbeValidator::new(&topology).validate([(ProbeKind::Liveness, &spec)]);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidProbeServicePath]);
    }

    #[test]
    fn test_path_of_service_on_other_port() {
        let topology = topology();
        let spec = ProbeSpec::new(9090, "/admin/health/live");
        let diagnostics = ProbeValidator::new(&topology).validate([(ProbeKind::Liveness, &spec)]);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::InvalidProbeServicePath]);
    }

    #[parameterized(
        no_port = { None, Some("/helloWorld/data"), "'port'" },
        no_path = { Some(9090), None, "'path'" },
        neither = { None, None, "'port' and 'path'" },
    )]
    fn test_missing_fields(port: Option<u16>, path: Option<&str>, expected: &str) {
        let topology = topology();
        let spec = ProbeSpec {
            port,
            path: path.map(str::to_string),
            ..Default::default()
        };
        let diagnostics = ProbeValidator::new(&topology).validate([(ProbeKind::Liveness, &spec)]);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::ProbeMissingField]);
        assert!(diagnostics.iter().next().unwrap().message.contains(expected));
    }

    #[test]
    fn test_probes_are_independent() {
        let topology = topology();
        let liveness = ProbeSpec::new(9090, "/helloWorld/data");
        let readiness = ProbeSpec::new(9090, "/helloWorld/missing");
        let validator = ProbeValidator::new(&topology);

        let forward = validator.validate([
            (ProbeKind::Liveness, &liveness),
            (ProbeKind::Readiness, &readiness),
        ]);
        let backward = validator.validate([
            (ProbeKind::Readiness, &readiness),
            (ProbeKind::Liveness, &liveness),
        ]);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 1);
    }
}
