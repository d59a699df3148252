//! Structural model of a program as handed over by the host toolchain

use crate::diagnostics::SourceLocation;
use crate::error::{C2cError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output target selected by the host for this build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Any number of services, one workload plus endpoints
    #[default]
    Standard,
    /// Stricter target where only the first declared service is deployable
    SingleService,
    /// The program runs to completion on a schedule
    ScheduledTask,
}

impl BuildMode {
    pub fn is_restricted(&self) -> bool {
        matches!(self, BuildMode::SingleService)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramModel {
    pub name: String,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Built executable, relative to the project directory
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleModel>,
}

impl ProgramModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_module(mut self, module: ModuleModel) -> Self {
        self.modules.push(module);
        self
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a JSON program model handed over by the host
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| C2cError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Identity used to key build sessions
    pub fn identity(&self) -> String {
        let mut id = String::new();
        if let Some(org) = &self.org {
            id.push_str(org);
            id.push('/');
        }
        id.push_str(&self.name);
        if let Some(version) = &self.version {
            id.push(':');
            id.push_str(version);
        }
        id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleModel {
    pub name: String,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub listener_types: Vec<ListenerTypeDecl>,
    #[serde(default)]
    pub services: Vec<ServiceDecl>,
    #[serde(default)]
    pub tasks: Vec<TaskDecl>,
}

impl ModuleModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_variable(mut self, variable: VariableDecl) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_listener_type(mut self, listener_type: ListenerTypeDecl) -> Self {
        self.listener_types.push(listener_type);
        self
    }

    pub fn with_service(mut self, service: ServiceDecl) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_task(mut self, task: TaskDecl) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn listener_type(&self, name: &str) -> Option<&ListenerTypeDecl> {
        self.listener_types.iter().find(|t| t.name == name)
    }
}

/// Module-level variable declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub initializer: Option<Expr>,
    /// Value may be supplied at deploy or run time
    #[serde(default)]
    pub configurable: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl VariableDecl {
    pub fn new(name: impl Into<String>, initializer: Expr) -> Self {
        Self {
            name: name.into(),
            initializer: Some(initializer),
            ..Default::default()
        }
    }

    pub fn configurable(name: impl Into<String>, default: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            type_name: Some("int".to_string()),
            initializer: default,
            configurable: true,
            location: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

/// Expression subset needed to reduce listener construction sites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Int { value: i64 },
    Str { value: String },
    Ref { name: String },
    New {
        #[serde(default)]
        type_name: Option<String>,
        #[serde(default)]
        args: Vec<Arg>,
    },
    Record {
        #[serde(default)]
        fields: Vec<Field>,
    },
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Int { value }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Str {
            value: value.into(),
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Expr::Ref { name: name.into() }
    }

    pub fn new_listener(type_name: Option<&str>, args: Vec<Arg>) -> Self {
        Expr::New {
            type_name: type_name.map(str::to_string),
            args,
        }
    }

    pub fn record(fields: Vec<Field>) -> Self {
        Expr::Record { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Expr> {
        match self {
            Expr::Record { fields } => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str { value } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default)]
    pub name: Option<String>,
    pub value: Expr,
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Expr,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// User-defined listener class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListenerTypeDecl {
    pub name: String,
    #[serde(default)]
    pub init_params: Vec<ParamDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    /// Annotated as the deploy-exposed port
    #[serde(default)]
    pub exposed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDecl {
    /// Raw absolute-path tokens, e.g. `["/", "hello", "/", "world"]`
    #[serde(default)]
    pub base_path: Vec<String>,
    #[serde(default)]
    pub listeners: Vec<Expr>,
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl ServiceDecl {
    pub fn new(base_path: &[&str]) -> Self {
        Self {
            base_path: base_path.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_listener(mut self, listener: Expr) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_resource(mut self, method: &str, path: &[&str]) -> Self {
        self.resources.push(ResourceDecl {
            method: method.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub method: String,
    /// Relative path segments; `["."]` is the service root
    #[serde(default)]
    pub path: Vec<String>,
}

/// Module-level scheduled task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDecl {
    pub name: String,
    #[serde(default)]
    pub minutes: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub day_of_month: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let mut program = ProgramModel::new("hello");
        assert_eq!(program.identity(), "hello");

        program.org = Some("acme".to_string());
        program.version = Some("0.1.0".to_string());
        assert_eq!(program.identity(), "acme/hello:0.1.0");
    }

    #[test]
    fn test_deserialize_program_json() {
        let json = r#"{
            "name": "hello",
            "modules": [{
                "name": "main",
                "variables": [
                    {"name": "ep", "type_name": "http:Listener",
                     "initializer": {"kind": "new",
                                     "args": [{"value": {"kind": "int", "value": 9090}}]}}
                ],
                "services": [{
                    "base_path": ["/", "helloWorld"],
                    "listeners": [{"kind": "ref", "name": "ep"}],
                    "resources": [{"method": "get", "path": ["sayHello"]}]
                }]
            }]
        }"#;

        let program: ProgramModel = serde_json::from_str(json).unwrap();
        let module = &program.modules[0];
        assert_eq!(module.services.len(), 1);
        assert_eq!(module.services[0].listeners[0], Expr::reference("ep"));
        assert!(matches!(
            module.variable("ep").and_then(|v| v.initializer.as_ref()),
            Some(Expr::New { type_name: None, .. })
        ));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = ProgramModel::from_json("{\"modules\": []}").unwrap_err();
        assert!(matches!(err, C2cError::ProgramParse(_)));
    }

    #[test]
    fn test_record_field_lookup() {
        let record = Expr::record(vec![Field::new("port", Expr::int(8080))]);
        assert_eq!(record.field("port"), Some(&Expr::int(8080)));
        assert_eq!(record.field("host"), None);
        assert_eq!(Expr::int(1).field("port"), None);
    }

    #[test]
    fn test_build_mode_restricted() {
        assert!(BuildMode::SingleService.is_restricted());
        assert!(!BuildMode::Standard.is_restricted());
        assert!(!BuildMode::ScheduledTask.is_restricted());
    }
}
