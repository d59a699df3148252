//! Listener resolver - reduces a listener reference to a bound port and transport security

use crate::diagnostics::{Diagnostic, DiagnosticCode, SourceLocation};
use crate::model::{Arg, Expr, ListenerTypeDecl, ModuleModel, VariableDecl};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Listener types that are recognized without a deploy-exposed annotation
const NATIVE_LISTENER_TYPES: &[(&str, Transport)] = &[
    ("http:Listener", Transport::Tcp),
    ("grpc:Listener", Transport::Tcp),
    ("graphql:Listener", Transport::Tcp),
    ("websocket:Listener", Transport::Tcp),
    ("websub:Listener", Transport::Tcp),
    ("tcp:Listener", Transport::Tcp),
    ("udp:Listener", Transport::Udp),
];

const PORT_FIELD: &str = "port";
const SECURE_SOCKET_FIELD: &str = "secureSocket";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerProtocol {
    Plain,
    Secure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    Tcp,
    Udp,
}

/// How a listener's port was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSource {
    Literal,
    ConfigField,
    ModuleVariable,
    ConfigurableDefault,
    ExposedParameter,
}

/// Transport-security material referenced by a listener, paths as written in source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureSocketConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_store_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutual_ssl_cert_path: Option<String>,
}

impl SecureSocketConfig {
    pub fn is_empty(&self) -> bool {
        self.cert_path.is_none()
            && self.key_path.is_none()
            && self.key_store_path.is_none()
            && self.trust_path.is_none()
            && self.mutual_ssl_cert_path.is_none()
    }

    /// Every file this configuration references
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        [
            &self.cert_path,
            &self.key_path,
            &self.key_store_path,
            &self.trust_path,
            &self.mutual_ssl_cert_path,
        ]
        .into_iter()
        .filter_map(|p| p.as_deref())
    }
}

/// A resolved listener binding. Two listeners are the same binding iff their ports match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerInfo {
    /// Module variable the listener is bound to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub port: u16,
    pub protocol: ListenerProtocol,
    pub transport: Transport,
    pub port_source: PortSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_socket: Option<SecureSocketConfig>,
}

impl PartialEq for ListenerInfo {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port
    }
}

impl Eq for ListenerInfo {}

impl Hash for ListenerInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.port.hash(state);
    }
}

impl ListenerInfo {
    pub fn is_secure(&self) -> bool {
        self.protocol == ListenerProtocol::Secure
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved {
        listener: ListenerInfo,
        warning: Option<Diagnostic>,
    },
    Unresolved(Diagnostic),
}

impl Resolution {
    pub fn listener(&self) -> Option<&ListenerInfo> {
        match self {
            Resolution::Resolved { listener, .. } => Some(listener),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// What a listener expression refers to, before any port is looked at
#[derive(Debug, Clone, Copy)]
pub enum ListenerRef<'a> {
    /// `new http:Listener(...)` of a natively recognized type
    Inline {
        transport: Transport,
        args: &'a [Arg],
    },
    /// Name of a module-level listener variable
    Variable(&'a VariableDecl),
    /// `new MyListener(...)` of a user-defined listener class
    Custom {
        decl: &'a ListenerTypeDecl,
        args: &'a [Arg],
    },
}

struct Reduced {
    port: u16,
    source: PortSource,
    warning: Option<Diagnostic>,
}

type PortLocator = fn(&[Arg]) -> Option<&Expr>;

/// Places a native listener constructor may carry its port, in priority order
const PORT_LOCATORS: &[(PortSource, PortLocator)] = &[
    (PortSource::Literal, positional_port),
    (PortSource::ConfigField, named_port),
];

pub struct ListenerResolver<'m> {
    module: &'m ModuleModel,
}

impl<'m> ListenerResolver<'m> {
    pub fn new(module: &'m ModuleModel) -> Self {
        Self { module }
    }

    pub fn resolve(&self, expr: &Expr, location: Option<&SourceLocation>) -> Resolution {
        let reference = match self.classify(expr, None) {
            Ok(r) => r,
            Err(diagnostic) => return Resolution::Unresolved(diagnostic.at(location)),
        };

        let (name, reference) = match reference {
            ListenerRef::Variable(decl) => {
                let location = decl.location.as_ref().or(location);
                let Some(init) = decl.initializer.as_ref() else {
                    return Resolution::Unresolved(
                        unresolved(format!("listener '{}' has no initializer", decl.name))
                            .at(location),
                    );
                };
                if matches!(init, Expr::Ref { .. }) {
                    return Resolution::Unresolved(
                        unresolved(format!(
                            "listener '{}' is bound to another variable; \
                             only direct initializers are resolved",
                            decl.name
                        ))
                        .at(location),
                    );
                }
                match self.classify(init, decl.type_name.as_deref()) {
                    Ok(r) => (Some(decl.name.clone()), r),
                    Err(diagnostic) => return Resolution::Unresolved(diagnostic.at(location)),
                }
            }
            other => (None, other),
        };

        let outcome = match reference {
            ListenerRef::Inline { transport, args } => self
                .resolve_native(args)
                .map(|reduced| (reduced, transport, self.secure_socket(args))),
            ListenerRef::Custom { decl, args } => self
                .resolve_custom(decl, args)
                .map(|reduced| (reduced, Transport::Tcp, None)),
            ListenerRef::Variable(_) => Err(unresolved("nested listener variable")),
        };

        match outcome {
            Ok((reduced, transport, secure_socket)) => {
                let listener = ListenerInfo {
                    name,
                    port: reduced.port,
                    protocol: if secure_socket.is_some() {
                        ListenerProtocol::Secure
                    } else {
                        ListenerProtocol::Plain
                    },
                    transport,
                    port_source: reduced.source,
                    secure_socket,
                };
                debug!(
                    port = listener.port,
                    source = ?listener.port_source,
                    secure = listener.is_secure(),
                    "Resolved listener"
                );
                Resolution::Resolved {
                    listener,
                    warning: reduced.warning.map(|w| w.at(location)),
                }
            }
            Err(diagnostic) => Resolution::Unresolved(diagnostic.at(location)),
        }
    }

    pub fn classify<'e>(
        &self,
        expr: &'e Expr,
        declared_type: Option<&str>,
    ) -> Result<ListenerRef<'e>, Diagnostic>
    where
        'm: 'e,
    {
        match expr {
            Expr::New { type_name, args } => {
                let type_name = type_name.as_deref().or(declared_type).ok_or_else(|| {
                    unresolved("listener construction has no resolvable type".to_string())
                })?;
                if let Some((_, transport)) =
                    NATIVE_LISTENER_TYPES.iter().find(|(t, _)| *t == type_name)
                {
                    return Ok(ListenerRef::Inline {
                        transport: *transport,
                        args,
                    });
                }
                self.module
                    .listener_type(type_name)
                    .map(|decl| ListenerRef::Custom { decl, args })
                    .ok_or_else(|| {
                        Diagnostic::error(
                            DiagnosticCode::UnsupportedListenerType,
                            format!("listener type '{}' is not supported", type_name),
                        )
                    })
            }
            Expr::Ref { name } => self
                .module
                .variable(name)
                .map(ListenerRef::Variable)
                .ok_or_else(|| unresolved(format!("listener variable '{}' not found", name))),
            _ => Err(unresolved(
                "listener reference is neither a construction nor a variable".to_string(),
            )),
        }
    }

    fn resolve_native(&self, args: &[Arg]) -> Result<Reduced, Diagnostic> {
        for (source, locate) in PORT_LOCATORS {
            if let Some(expr) = locate(args) {
                return self.reduce_port(expr, *source);
            }
        }
        Err(unresolved("listener does not declare a port".to_string()))
    }

    fn resolve_custom(&self, decl: &ListenerTypeDecl, args: &[Arg]) -> Result<Reduced, Diagnostic> {
        let Some((index, param)) = decl.init_params.iter().enumerate().find(|(_, p)| p.exposed)
        else {
            return Err(Diagnostic::error(
                DiagnosticCode::UnsupportedListenerType,
                format!(
                    "listener type '{}' has no parameter marked as the exposed port",
                    decl.name
                ),
            ));
        };

        let expr = args
            .iter()
            .find(|a| a.name.as_deref() == Some(param.name.as_str()))
            .or_else(|| args.iter().filter(|a| a.name.is_none()).nth(index))
            .map(|a| &a.value)
            .ok_or_else(|| {
                unresolved(format!(
                    "exposed parameter '{}' of '{}' is not supplied",
                    param.name, decl.name
                ))
            })?;

        self.reduce_port(expr, PortSource::ExposedParameter)
    }

    fn reduce_port(&self, expr: &Expr, source: PortSource) -> Result<Reduced, Diagnostic> {
        match expr {
            Expr::Int { value } => Ok(Reduced {
                port: to_port(*value)?,
                source,
                warning: None,
            }),
            Expr::Ref { name } => {
                let decl = self
                    .module
                    .variable(name)
                    .ok_or_else(|| unresolved(format!("port variable '{}' not found", name)))?;
                self.reduce_port_variable(decl)
            }
            _ => Err(unresolved("port is not an integer".to_string())),
        }
    }

    // One level only: the variable's own initializer must be a literal.
    fn reduce_port_variable(&self, decl: &VariableDecl) -> Result<Reduced, Diagnostic> {
        let location = decl.location.as_ref();
        match (&decl.initializer, decl.configurable) {
            (Some(Expr::Int { value }), true) if *value != 0 => Ok(Reduced {
                port: to_port(*value).map_err(|d| d.at(location))?,
                source: PortSource::ConfigurableDefault,
                warning: Some(
                    Diagnostic::warning(
                        DiagnosticCode::ConfigurablePortDefault,
                        format!(
                            "port variable '{}' is configurable; \
                             default {} may be overridden at runtime",
                            decl.name, value
                        ),
                    )
                    .at(location),
                ),
            }),
            (None | Some(Expr::Int { .. }), true) => Err(Diagnostic::error(
                DiagnosticCode::ConfigurablePortNoDefault,
                format!(
                    "port variable '{}' is configurable without a default value",
                    decl.name
                ),
            )
            .at(location)),
            (Some(_), true) => Err(unresolved(format!(
                "port variable '{}' is configurable but its default is not an integer literal",
                decl.name
            ))
            .at(location)),
            (Some(Expr::Int { value }), false) => Ok(Reduced {
                port: to_port(*value).map_err(|d| d.at(location))?,
                source: PortSource::ModuleVariable,
                warning: None,
            }),
            _ => Err(unresolved(format!(
                "port variable '{}' does not have a literal initializer",
                decl.name
            ))
            .at(location)),
        }
    }

    fn secure_socket(&self, args: &[Arg]) -> Option<SecureSocketConfig> {
        let block = args
            .iter()
            .find(|a| a.name.as_deref() == Some(SECURE_SOCKET_FIELD))
            .map(|a| &a.value)
            .or_else(|| config_records(args).find_map(|r| r.field(SECURE_SOCKET_FIELD)))?;
        let block = self.deref_record(block)?;

        let mut config = SecureSocketConfig::default();
        if let Some(key) = block.field("key").and_then(|k| self.deref_record(k)) {
            config.cert_path = key.field("certFile").and_then(Expr::as_str).map(str::to_string);
            config.key_path = key.field("keyFile").and_then(Expr::as_str).map(str::to_string);
            config.key_store_path = key.field("path").and_then(Expr::as_str).map(str::to_string);
        }
        config.trust_path = block.field("cert").and_then(|c| self.path_of(c));
        config.mutual_ssl_cert_path = block
            .field("mutualSsl")
            .and_then(|m| self.deref_record(m))
            .and_then(|m| m.field("cert"))
            .and_then(|c| self.path_of(c));

        if config.is_empty() {
            None
        } else {
            Some(config)
        }
    }

    fn deref_record<'e>(&self, expr: &'e Expr) -> Option<&'e Expr>
    where
        'm: 'e,
    {
        match expr {
            Expr::Record { .. } => Some(expr),
            Expr::Ref { name } => self
                .module
                .variable(name)
                .and_then(|v| v.initializer.as_ref())
                .filter(|init| matches!(init, Expr::Record { .. })),
            _ => None,
        }
    }

    // A trust/cert entry is either a bare path or a `{path: ...}` store record.
    fn path_of(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Str { value } => Some(value.clone()),
            other => self
                .deref_record(other)
                .and_then(|r| r.field("path"))
                .and_then(Expr::as_str)
                .map(str::to_string),
        }
    }
}

fn positional_port(args: &[Arg]) -> Option<&Expr> {
    args.iter()
        .find(|a| a.name.is_none())
        .map(|a| &a.value)
        .filter(|v| matches!(v, Expr::Int { .. } | Expr::Ref { .. }))
}

fn named_port(args: &[Arg]) -> Option<&Expr> {
    args.iter()
        .find(|a| a.name.as_deref() == Some(PORT_FIELD))
        .map(|a| &a.value)
        .or_else(|| config_records(args).find_map(|r| r.field(PORT_FIELD)))
}

fn config_records(args: &[Arg]) -> impl Iterator<Item = &Expr> {
    args.iter()
        .map(|a| &a.value)
        .filter(|v| matches!(v, Expr::Record { .. }))
}

fn to_port(value: i64) -> Result<u16, Diagnostic> {
    u16::try_from(value)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| unresolved(format!("{} is not a valid port", value)))
}

fn unresolved(message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::UnresolvedListenerPort, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::model::{Field, ParamDecl};

    fn http(args: Vec<Arg>) -> Expr {
        Expr::new_listener(Some("http:Listener"), args)
    }

    fn resolved(resolution: Resolution) -> (ListenerInfo, Option<Diagnostic>) {
        match resolution {
            Resolution::Resolved { listener, warning } => (listener, warning),
            Resolution::Unresolved(d) => panic!("expected resolution, got {}", d),
        }
    }

    fn unresolved_of(resolution: Resolution) -> Diagnostic {
        match resolution {
            Resolution::Unresolved(d) => d,
            Resolution::Resolved { listener, .. } => {
                panic!("expected failure, got port {}", listener.port)
            }
        }
    }

    #[test]
    fn test_inline_literal_port() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let (listener, warning) =
            resolved(resolver.resolve(&http(vec![Arg::positional(Expr::int(9090))]), None));
        assert_eq!(listener.port, 9090);
        assert_eq!(listener.port_source, PortSource::Literal);
        assert_eq!(listener.protocol, ListenerProtocol::Plain);
        assert!(listener.name.is_none());
        assert!(warning.is_none());
    }

    #[test]
    fn test_named_port_argument() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::named("port", Expr::int(8080))]);
        let (listener, _) = resolved(resolver.resolve(&expr, None));
        assert_eq!(listener.port, 8080);
        assert_eq!(listener.port_source, PortSource::ConfigField);
    }

    #[test]
    fn test_port_field_in_config_record() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::record(vec![Field::new(
            "port",
            Expr::int(7070),
        )]))]);
        let (listener, _) = resolved(resolver.resolve(&expr, None));
        assert_eq!(listener.port, 7070);
        assert_eq!(listener.port_source, PortSource::ConfigField);
    }

    #[test]
    fn test_listener_variable_uses_declared_type() {
        let module = ModuleModel::new("main").with_variable(
            VariableDecl::new(
                "ep",
                Expr::new_listener(None, vec![Arg::positional(Expr::int(9091))]),
            )
            .with_type("http:Listener"),
        );
        let resolver = ListenerResolver::new(&module);

        let (listener, _) = resolved(resolver.resolve(&Expr::reference("ep"), None));
        assert_eq!(listener.port, 9091);
        assert_eq!(listener.name.as_deref(), Some("ep"));
    }

    #[test]
    fn test_port_from_module_variable() {
        let module =
            ModuleModel::new("main").with_variable(VariableDecl::new("port", Expr::int(9095)));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::reference("port"))]);
        let (listener, warning) = resolved(resolver.resolve(&expr, None));
        assert_eq!(listener.port, 9095);
        assert_eq!(listener.port_source, PortSource::ModuleVariable);
        assert!(warning.is_none());
    }

    #[test]
    fn test_transitive_variable_is_not_followed() {
        let module = ModuleModel::new("main")
            .with_variable(VariableDecl::new("base", Expr::int(9000)))
            .with_variable(VariableDecl::new("port", Expr::reference("base")));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::reference("port"))]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::UnresolvedListenerPort);
    }

    #[test]
    fn test_configurable_port_with_default_warns() {
        let module = ModuleModel::new("main")
            .with_variable(VariableDecl::configurable("port", Some(Expr::int(9090))));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::reference("port"))]);
        let (listener, warning) = resolved(resolver.resolve(&expr, None));
        assert_eq!(listener.port, 9090);
        assert_eq!(listener.port_source, PortSource::ConfigurableDefault);
        let warning = warning.unwrap();
        assert_eq!(warning.severity, Severity::Warning);
        assert!(warning.message.contains("may be overridden at runtime"));
    }

    #[test]
    fn test_configurable_port_without_default_fails() {
        let module =
            ModuleModel::new("main").with_variable(VariableDecl::configurable("port", None));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::reference("port"))]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::ConfigurablePortNoDefault);
        assert_eq!(diagnostic.severity, Severity::Error);
    }

    #[test]
    fn test_configurable_port_with_zero_default_fails() {
        let module = ModuleModel::new("main")
            .with_variable(VariableDecl::configurable("port", Some(Expr::int(0))));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::reference("port"))]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::ConfigurablePortNoDefault);
    }

    #[test]
    fn test_configurable_port_with_reference_default_is_unresolved() {
        let module = ModuleModel::new("main")
            .with_variable(VariableDecl::new("base", Expr::int(9000)))
            .with_variable(VariableDecl::configurable("port", Some(Expr::reference("base"))));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::reference("port"))]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::UnresolvedListenerPort);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.message.contains("not an integer literal"));
    }

    #[test]
    fn test_custom_listener_with_exposed_parameter() {
        let module = ModuleModel::new("main").with_listener_type(ListenerTypeDecl {
            name: "CustomListener".to_string(),
            init_params: vec![
                ParamDecl {
                    name: "host".to_string(),
                    exposed: false,
                },
                ParamDecl {
                    name: "port".to_string(),
                    exposed: true,
                },
            ],
        });
        let resolver = ListenerResolver::new(&module);

        let expr = Expr::new_listener(
            Some("CustomListener"),
            vec![
                Arg::positional(Expr::string("0.0.0.0")),
                Arg::positional(Expr::int(6060)),
            ],
        );
        let (listener, _) = resolved(resolver.resolve(&expr, None));
        assert_eq!(listener.port, 6060);
        assert_eq!(listener.port_source, PortSource::ExposedParameter);
    }

    #[test]
    fn test_custom_listener_without_exposed_parameter() {
        let module = ModuleModel::new("main").with_listener_type(ListenerTypeDecl {
            name: "Opaque".to_string(),
            init_params: vec![ParamDecl {
                name: "port".to_string(),
                exposed: false,
            }],
        });
        let resolver = ListenerResolver::new(&module);

        let expr = Expr::new_listener(Some("Opaque"), vec![Arg::positional(Expr::int(1))]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::UnsupportedListenerType);
    }

    #[test]
    fn test_unknown_listener_type() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let expr = Expr::new_listener(Some("kafka:Listener"), vec![]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::UnsupportedListenerType);
    }

    #[test]
    fn test_out_of_range_port() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::int(70000))]);
        let diagnostic = unresolved_of(resolver.resolve(&expr, None));
        assert_eq!(diagnostic.code, DiagnosticCode::UnresolvedListenerPort);
    }

    #[test]
    fn test_secure_socket_cert_and_key() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let secure = Expr::record(vec![Field::new(
            "key",
            Expr::record(vec![
                Field::new("certFile", Expr::string("./resources/public.crt")),
                Field::new("keyFile", Expr::string("./resources/private.key")),
            ]),
        )]);
        let expr = http(vec![
            Arg::positional(Expr::int(9443)),
            Arg::named("secureSocket", secure),
        ]);

        let (listener, _) = resolved(resolver.resolve(&expr, None));
        assert!(listener.is_secure());
        let tls = listener.secure_socket.unwrap();
        assert_eq!(tls.cert_path.as_deref(), Some("./resources/public.crt"));
        assert_eq!(tls.key_path.as_deref(), Some("./resources/private.key"));
        assert!(tls.trust_path.is_none());
    }

    #[test]
    fn test_secure_socket_stores_and_mutual_ssl() {
        let tls_config = Expr::record(vec![
            Field::new(
                "key",
                Expr::record(vec![Field::new("path", Expr::string("./security/keystore.p12"))]),
            ),
            Field::new(
                "cert",
                Expr::record(vec![Field::new("path", Expr::string("./security/truststore.p12"))]),
            ),
            Field::new(
                "mutualSsl",
                Expr::record(vec![Field::new("cert", Expr::string("./ca/client-ca.crt"))]),
            ),
        ]);
        let module = ModuleModel::new("main").with_variable(VariableDecl::new("tls", tls_config));
        let resolver = ListenerResolver::new(&module);

        let expr = http(vec![Arg::positional(Expr::record(vec![
            Field::new("port", Expr::int(9443)),
            Field::new("secureSocket", Expr::reference("tls")),
        ]))]);

        let (listener, _) = resolved(resolver.resolve(&expr, None));
        assert_eq!(listener.port, 9443);
        let tls = listener.secure_socket.unwrap();
        assert_eq!(tls.key_store_path.as_deref(), Some("./security/keystore.p12"));
        assert_eq!(tls.trust_path.as_deref(), Some("./security/truststore.p12"));
        assert_eq!(tls.mutual_ssl_cert_path.as_deref(), Some("./ca/client-ca.crt"));
        assert_eq!(tls.paths().count(), 3);
    }

    #[test]
    fn test_listener_equality_is_by_port() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);

        let positional = http(vec![Arg::positional(Expr::int(9090))]);
        let named = http(vec![Arg::named("port", Expr::int(9090))]);
        let (a, _) = resolved(resolver.resolve(&positional, None));
        let (b, _) = resolved(resolver.resolve(&named, None));
        assert_ne!(a.port_source, b.port_source);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unresolved_carries_location() {
        let module = ModuleModel::new("main");
        let resolver = ListenerResolver::new(&module);
        let location = SourceLocation::new("main.bal", 10, 1);

        let diagnostic =
            unresolved_of(resolver.resolve(&Expr::reference("missing"), Some(&location)));
        assert_eq!(diagnostic.location, Some(location));
    }
}
