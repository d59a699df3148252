//! Structured diagnostics produced by extraction, configuration, synthesis and validation
//!
//! Data-shape problems never surface as Rust errors. Every component appends
//! [`Diagnostic`] values to a [`Diagnostics`] accumulator and keeps going with
//! whatever part of its output is still valid.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Stable diagnostic codes reported to the host toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DiagnosticCode {
    UnresolvedListenerPort,
    ConfigurablePortDefault,
    ConfigurablePortNoDefault,
    UnsupportedListenerType,
    ServiceLimitExceeded,
    InvalidSchedule,
    UnreadableMountFile,
    ReservedMountPath,
    DuplicateMountKey,
    InvalidResourceQuantity,
    InvalidEnvOverride,
    InvalidPortMapping,
    InvalidAutoscaling,
    UnreadableSecureSocketFile,
    ProbeMissingField,
    InvalidProbePort,
    InvalidProbePath,
    InvalidProbeServicePath,
    InvalidProbeResourcePath,
    DuplicateArtifactName,
    EmptyImageName,
}

impl DiagnosticCode {
    const ALL: [DiagnosticCode; 21] = [
        DiagnosticCode::UnresolvedListenerPort,
        DiagnosticCode::ConfigurablePortDefault,
        DiagnosticCode::ConfigurablePortNoDefault,
        DiagnosticCode::UnsupportedListenerType,
        DiagnosticCode::ServiceLimitExceeded,
        DiagnosticCode::InvalidSchedule,
        DiagnosticCode::UnreadableMountFile,
        DiagnosticCode::ReservedMountPath,
        DiagnosticCode::DuplicateMountKey,
        DiagnosticCode::InvalidResourceQuantity,
        DiagnosticCode::InvalidEnvOverride,
        DiagnosticCode::InvalidPortMapping,
        DiagnosticCode::InvalidAutoscaling,
        DiagnosticCode::UnreadableSecureSocketFile,
        DiagnosticCode::ProbeMissingField,
        DiagnosticCode::InvalidProbePort,
        DiagnosticCode::InvalidProbePath,
        DiagnosticCode::InvalidProbeServicePath,
        DiagnosticCode::InvalidProbeResourcePath,
        DiagnosticCode::DuplicateArtifactName,
        DiagnosticCode::EmptyImageName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnresolvedListenerPort => "C2C101",
            DiagnosticCode::ConfigurablePortDefault => "C2C102",
            DiagnosticCode::ConfigurablePortNoDefault => "C2C103",
            DiagnosticCode::UnsupportedListenerType => "C2C104",
            DiagnosticCode::ServiceLimitExceeded => "C2C110",
            DiagnosticCode::InvalidSchedule => "C2C120",
            DiagnosticCode::UnreadableMountFile => "C2C201",
            DiagnosticCode::ReservedMountPath => "C2C202",
            DiagnosticCode::DuplicateMountKey => "C2C203",
            DiagnosticCode::InvalidResourceQuantity => "C2C204",
            DiagnosticCode::InvalidEnvOverride => "C2C205",
            DiagnosticCode::InvalidPortMapping => "C2C206",
            DiagnosticCode::InvalidAutoscaling => "C2C207",
            DiagnosticCode::UnreadableSecureSocketFile => "C2C208",
            DiagnosticCode::ProbeMissingField => "C2C301",
            DiagnosticCode::InvalidProbePort => "C2C302",
            DiagnosticCode::InvalidProbePath => "C2C303",
            DiagnosticCode::InvalidProbeServicePath => "C2C304",
            DiagnosticCode::InvalidProbeResourcePath => "C2C305",
            DiagnosticCode::DuplicateArtifactName => "C2C401",
            DiagnosticCode::EmptyImageName => "C2C402",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DiagnosticCode> for String {
    fn from(code: DiagnosticCode) -> Self {
        code.as_str().to_string()
    }
}

impl TryFrom<String> for DiagnosticCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == value)
            .ok_or_else(|| format!("unknown diagnostic code: {}", value))
    }
}

/// Location of the declaration a diagnostic refers to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
            location: None,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Warning,
            location: None,
        }
    }

    pub fn at(mut self, location: Option<&SourceLocation>) -> Self {
        self.location = location.cloned();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

/// Ordered accumulator; diagnostics are reported in the order they were raised
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(code = %diagnostic.code, "{}", diagnostic.message),
            Severity::Error => tracing::debug!(code = %diagnostic.code, "{}", diagnostic.message),
        }
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self { items }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trips_through_string() {
        for code in DiagnosticCode::ALL {
            let s: String = code.into();
            assert_eq!(DiagnosticCode::try_from(s).unwrap(), code);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in DiagnosticCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate code {}", code);
        }
    }

    #[test]
    fn test_has_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::ConfigurablePortDefault,
            "may be overridden",
        ));
        assert!(!diagnostics.has_errors());

        diagnostics.push(Diagnostic::error(
            DiagnosticCode::InvalidProbePort,
            "invalid probe port",
        ));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn test_display_includes_location() {
        let diagnostic = Diagnostic::error(DiagnosticCode::UnresolvedListenerPort, "no port")
            .at(Some(&SourceLocation::new("main.bal", 3, 9)));
        assert_eq!(diagnostic.to_string(), "ERROR [C2C101] no port (main.bal:3:9)");
    }
}
