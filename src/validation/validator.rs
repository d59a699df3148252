use crate::diagnostics::Diagnostics;
use crate::synthesis::ArtifactGraph;
use crate::validation::rules::{NonEmptyImageRule, UniqueArtifactNamesRule, ValidationRule};
use tracing::debug;

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Runs every rule in order; all findings are collected, none short-circuit
    pub fn validate(&self, graph: &mut ArtifactGraph) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for rule in &self.rules {
            let found = rule.validate(graph);
            debug!(rule = rule.name(), findings = found.len(), "Validation rule applied");
            for diagnostic in found {
                diagnostics.push(diagnostic);
            }
        }
        diagnostics
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            rules: vec![Box::new(UniqueArtifactNamesRule), Box::new(NonEmptyImageRule)],
        }
    }
}
