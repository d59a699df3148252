//! Output formatting for generate and validate results
//!
//! JSON and YAML are plain serde dumps of the data models. The human format is
//! a short summary meant for terminals.

use anyhow::{Context, Result};

use crate::diagnostics::Diagnostics;
use crate::session::BuildOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Artifact graph, build model and diagnostics
    pub fn format(&self, output: &BuildOutput) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(output)
                .context("Failed to serialize build output to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(output).context("Failed to serialize build output to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(output)),
        }
    }

    pub fn format_diagnostics(&self, diagnostics: &Diagnostics) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(diagnostics)
                .context("Failed to serialize diagnostics to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(diagnostics)
                .context("Failed to serialize diagnostics to YAML"),
            OutputFormat::Human => Ok(Self::diagnostics_human(diagnostics)),
        }
    }

    fn format_human(&self, output: &BuildOutput) -> String {
        let mut text = String::new();

        if output.has_errors() {
            text.push_str("\u{26A0} Deployment Artifacts (with errors)\n");
        } else {
            text.push_str("\u{2713} Deployment Artifacts\n");
        }
        text.push_str(&"\u{2501}".repeat(42));
        text.push_str("\n\n");

        let names = output.graph.names();
        text.push_str("Artifacts:\n");
        for (i, (kind, name)) in names.iter().enumerate() {
            let connector = if i == names.len() - 1 { "\u{2514}" } else { "\u{251C}" };
            text.push_str(&format!("{}\u{2500} {:<17} {}\n", connector, kind.to_string(), name));
        }
        text.push('\n');

        text.push_str(&output.build.to_string());
        text.push('\n');

        text.push_str(&Self::diagnostics_human(&output.diagnostics));
        text
    }

    fn diagnostics_human(diagnostics: &Diagnostics) -> String {
        if diagnostics.is_empty() {
            return "Diagnostics: none\n".to_string();
        }

        let mut text = format!(
            "Diagnostics: {} error(s), {} warning(s)\n",
            diagnostics.errors().count(),
            diagnostics.warnings().count()
        );
        for diagnostic in diagnostics.iter() {
            text.push_str(&format!("  {}\n", diagnostic));
        }
        text
    }
}
