use std::path::PathBuf;
use thiserror::Error;

/// Host-environment failures that abort a run
///
/// Problems with the shape of the program or its configuration are reported as
/// [`crate::diagnostics::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum C2cError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project configuration {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse program model: {0}")]
    ProgramParse(#[from] serde_json::Error),

    #[error("Build session for '{0}' already exists")]
    SessionExists(String),

    #[error("No build session for '{0}'")]
    SessionNotFound(String),

    #[error("Build session for '{program}' is missing its {stage} result")]
    StageMissing {
        program: String,
        stage: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, C2cError>;
