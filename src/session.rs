//! Build sessions
//!
//! A [`BuildSession`] carries everything one build accumulates between phases:
//! the inputs, each phase's result and the diagnostics raised so far. Sessions
//! live in a caller-owned [`SessionRegistry`] keyed by program identity and are
//! destroyed explicitly when the build ends.

use crate::config::{EnvOverrides, ProjectConfig, ResolvedConfig};
use crate::diagnostics::Diagnostics;
use crate::error::{C2cError, Result};
use crate::model::{BuildMode, ProgramModel};
use crate::synthesis::{ArtifactGraph, BuildModel};
use crate::topology::Topology;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Final result of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutput {
    pub graph: ArtifactGraph,
    pub build: BuildModel,
    pub diagnostics: Diagnostics,
}

impl BuildOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

#[derive(Debug)]
pub struct BuildSession {
    program: ProgramModel,
    mode: BuildMode,
    project: Option<ProjectConfig>,
    env: EnvOverrides,
    project_dir: PathBuf,
    topology: Option<Topology>,
    config: Option<ResolvedConfig>,
    graph: Option<ArtifactGraph>,
    build: Option<BuildModel>,
    diagnostics: Diagnostics,
}

impl BuildSession {
    pub fn new(program: ProgramModel, mode: BuildMode) -> Self {
        Self {
            program,
            mode,
            project: None,
            env: EnvOverrides::new(),
            project_dir: PathBuf::from("."),
            topology: None,
            config: None,
            graph: None,
            build: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_project(mut self, project: ProjectConfig) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    pub fn identity(&self) -> String {
        self.program.identity()
    }

    pub fn program(&self) -> &ProgramModel {
        &self.program
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn project(&self) -> Option<&ProjectConfig> {
        self.project.as_ref()
    }

    pub fn env(&self) -> &EnvOverrides {
        &self.env
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn record(&mut self, diagnostics: Diagnostics) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = Some(topology);
    }

    pub fn set_config(&mut self, config: ResolvedConfig) {
        self.config = Some(config);
    }

    pub fn set_graph(&mut self, graph: ArtifactGraph) {
        self.graph = Some(graph);
    }

    pub fn set_build(&mut self, build: BuildModel) {
        self.build = Some(build);
    }

    pub fn topology(&self) -> Result<&Topology> {
        self.topology.as_ref().ok_or_else(|| self.missing("topology"))
    }

    pub fn config(&self) -> Result<&ResolvedConfig> {
        self.config.as_ref().ok_or_else(|| self.missing("configuration"))
    }

    pub fn graph(&self) -> Result<&ArtifactGraph> {
        self.graph.as_ref().ok_or_else(|| self.missing("artifact graph"))
    }

    pub fn graph_mut(&mut self) -> Result<&mut ArtifactGraph> {
        let missing = self.missing("artifact graph");
        self.graph.as_mut().ok_or(missing)
    }

    pub fn into_output(self) -> Result<BuildOutput> {
        let program = self.program.identity();
        let graph = self.graph.ok_or_else(|| C2cError::StageMissing {
            program: program.clone(),
            stage: "artifact graph",
        })?;
        let build = self.build.ok_or(C2cError::StageMissing {
            program,
            stage: "image build",
        })?;
        Ok(BuildOutput {
            graph,
            build,
            diagnostics: self.diagnostics,
        })
    }

    fn missing(&self, stage: &'static str) -> C2cError {
        C2cError::StageMissing {
            program: self.program.identity(),
            stage,
        }
    }
}

/// Sessions of the builds currently in flight
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, BuildSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session; a program may only have one build in flight
    pub fn create(&mut self, session: BuildSession) -> Result<&mut BuildSession> {
        let id = session.identity();
        if self.sessions.contains_key(&id) {
            return Err(C2cError::SessionExists(id));
        }
        debug!(program = %id, "Build session created");
        Ok(self.sessions.entry(id).or_insert(session))
    }

    pub fn get(&self, id: &str) -> Result<&BuildSession> {
        self.sessions
            .get(id)
            .ok_or_else(|| C2cError::SessionNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut BuildSession> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| C2cError::SessionNotFound(id.to_string()))
    }

    /// Remove and return a session, ending the build
    pub fn destroy(&mut self, id: &str) -> Result<BuildSession> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| C2cError::SessionNotFound(id.to_string()))?;
        debug!(program = %id, "Build session destroyed");
        Ok(session)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
