//! Environment overrides
//!
//! # Environment Variables
//! - `C2C_REPLICAS`: replica count
//! - `C2C_MIN_CPU` / `C2C_MAX_CPU`: cpu request / limit
//! - `C2C_MIN_MEMORY` / `C2C_MAX_MEMORY`: memory request / limit
//! - `C2C_IMAGE_REGISTRY`, `C2C_IMAGE_NAME`, `C2C_IMAGE_TAG`, `C2C_BASE_IMAGE`
//! - `C2C_LIVENESS_PORT`, `C2C_LIVENESS_PATH`
//! - `C2C_READINESS_PORT`, `C2C_READINESS_PATH`

use super::layer::{
    checked_cpu, checked_memory, ConfigLayer, ImageLayer, ProbeSpec, ResourceQuantities,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const ENV_PREFIX: &str = "C2C_";

pub const REPLICAS: &str = "C2C_REPLICAS";
pub const MIN_CPU: &str = "C2C_MIN_CPU";
pub const MAX_CPU: &str = "C2C_MAX_CPU";
pub const MIN_MEMORY: &str = "C2C_MIN_MEMORY";
pub const MAX_MEMORY: &str = "C2C_MAX_MEMORY";
pub const IMAGE_REGISTRY: &str = "C2C_IMAGE_REGISTRY";
pub const IMAGE_NAME: &str = "C2C_IMAGE_NAME";
pub const IMAGE_TAG: &str = "C2C_IMAGE_TAG";
pub const BASE_IMAGE: &str = "C2C_BASE_IMAGE";
pub const LIVENESS_PORT: &str = "C2C_LIVENESS_PORT";
pub const LIVENESS_PATH: &str = "C2C_LIVENESS_PATH";
pub const READINESS_PORT: &str = "C2C_READINESS_PORT";
pub const READINESS_PATH: &str = "C2C_READINESS_PATH";

/// Snapshot of the `C2C_*` variables relevant to deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    vars: BTreeMap<String, String>,
}

impl EnvOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an explicit set of variables; anything without the prefix is ignored
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        Self { vars }
    }

    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn to_layer(&self, diagnostics: &mut Diagnostics) -> ConfigLayer {
        ConfigLayer {
            replicas: self.parsed(REPLICAS, diagnostics),
            requests: ResourceQuantities {
                cpu: checked_cpu(self.get(MIN_CPU), MIN_CPU, diagnostics),
                memory: checked_memory(self.get(MIN_MEMORY), MIN_MEMORY, diagnostics),
            },
            limits: ResourceQuantities {
                cpu: checked_cpu(self.get(MAX_CPU), MAX_CPU, diagnostics),
                memory: checked_memory(self.get(MAX_MEMORY), MAX_MEMORY, diagnostics),
            },
            liveness: self.probe(LIVENESS_PORT, LIVENESS_PATH, diagnostics),
            readiness: self.probe(READINESS_PORT, READINESS_PATH, diagnostics),
            image: ImageLayer {
                registry: self.owned(IMAGE_REGISTRY),
                name: self.owned(IMAGE_NAME),
                tag: self.owned(IMAGE_TAG),
                base: self.owned(BASE_IMAGE),
                cmd: None,
            },
            ..Default::default()
        }
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn parsed<T: FromStr>(&self, key: &str, diagnostics: &mut Diagnostics) -> Option<T> {
        let raw = self.get(key)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::InvalidEnvOverride,
                    format!("ignoring {}='{}': not a valid number", key, raw),
                ));
                None
            }
        }
    }

    fn probe(
        &self,
        port_key: &str,
        path_key: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<ProbeSpec> {
        let port = self.parsed::<u16>(port_key, diagnostics);
        let path = self.owned(path_key);
        if port.is_none() && path.is_none() {
            return None;
        }
        Some(ProbeSpec {
            port,
            path,
            ..Default::default()
        })
    }
}
