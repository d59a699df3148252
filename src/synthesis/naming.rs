//! Deterministic artifact names

/// Role postfix appended to a sanitized base identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Deployment,
    Service,
    Job,
    ConfigMap,
    Secret,
    Autoscaler,
    SecureSocket,
    KeyStore,
    TrustStore,
    MutualSsl,
}

impl Role {
    pub fn postfix(&self) -> &'static str {
        match self {
            Role::Deployment => "-deployment",
            Role::Service => "-svc",
            Role::Job => "-job",
            Role::ConfigMap => "-config-map",
            Role::Secret => "-secret",
            Role::Autoscaler => "-hpa",
            Role::SecureSocket => "-secure-socket",
            Role::KeyStore => "-keystore",
            Role::TrustStore => "-truststore",
            Role::MutualSsl => "-mutual-ssl",
        }
    }
}

/// Lower-case, collapse non-alphanumeric runs to one hyphen, trim hyphens
pub fn sanitize(base: &str) -> String {
    let mut name = String::with_capacity(base.len());
    let mut pending_hyphen = false;
    for c in base.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !name.is_empty() {
                name.push('-');
            }
            pending_hyphen = false;
            name.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    name
}

pub fn artifact_name(base: &str, role: Role) -> String {
    let mut name = sanitize(base);
    name.push_str(role.postfix());
    name
}
