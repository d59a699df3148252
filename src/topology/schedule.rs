//! Scheduled-task extraction

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::model::TaskDecl;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const ANY: &str = "*";

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\*|\d+)(-\d+)?(/\d+)?(,(\*|\d+)(-\d+)?(/\d+)?)*$")
            .expect("schedule field pattern is valid")
    })
}

/// Five-field cron-like schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub minutes: String,
    pub hours: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            minutes: ANY.to_string(),
            hours: ANY.to_string(),
            day_of_month: ANY.to_string(),
            month: ANY.to_string(),
            day_of_week: ANY.to_string(),
        }
    }
}

impl Schedule {
    pub fn from_task(task: &TaskDecl) -> Self {
        let field = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(ANY)
                .to_string()
        };
        Self {
            minutes: field(&task.minutes),
            hours: field(&task.hours),
            day_of_month: field(&task.day_of_month),
            month: field(&task.month),
            day_of_week: field(&task.day_of_week),
        }
    }

    /// Parses a space-separated five-field expression
    pub fn parse(expression: &str) -> Result<Self, Diagnostic> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        let [minutes, hours, day_of_month, month, day_of_week] = fields[..] else {
            return Err(Diagnostic::error(
                DiagnosticCode::InvalidSchedule,
                format!(
                    "schedule '{}' must have exactly five fields, found {}",
                    expression,
                    fields.len()
                ),
            ));
        };
        let schedule = Self {
            minutes: minutes.to_string(),
            hours: hours.to_string(),
            day_of_month: day_of_month.to_string(),
            month: month.to_string(),
            day_of_week: day_of_week.to_string(),
        };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<(), Diagnostic> {
        let fields = [
            ("minutes", &self.minutes),
            ("hours", &self.hours),
            ("day of month", &self.day_of_month),
            ("month", &self.month),
            ("day of week", &self.day_of_week),
        ];
        for (label, value) in fields {
            if !field_pattern().is_match(value) {
                return Err(Diagnostic::error(
                    DiagnosticCode::InvalidSchedule,
                    format!("invalid {} field '{}' in schedule", label, value),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minutes, self.hours, self.day_of_month, self.month, self.day_of_week
        )
    }
}

/// Scheduled task discovered in the program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub name: String,
    /// `None` when the declared schedule failed validation
    pub schedule: Option<Schedule>,
}
