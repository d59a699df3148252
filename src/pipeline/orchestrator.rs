use super::phase_trait::BuildPhase;
use super::phases::{ExtractPhase, ResolveConfigPhase, SynthesizePhase, ValidatePhase};
use crate::fs::{FileSystem, RealFileSystem};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::session::{BuildOutput, BuildSession, SessionRegistry};
use crate::validation::Validator;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct PipelineOrchestrator {
    phases: Vec<Box<dyn BuildPhase>>,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineOrchestrator {
    /// Extract -> ResolveConfig -> Synthesize -> Validate
    pub fn new(fs: Arc<dyn FileSystem>, validator: Arc<Validator>) -> Self {
        Self {
            phases: vec![
                Box::new(ExtractPhase),
                Box::new(ResolveConfigPhase::new(fs)),
                Box::new(SynthesizePhase),
                Box::new(ValidatePhase::new(validator)),
            ],
            progress_handler: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    /// Run every phase over a session that is already registered
    pub fn execute(&self, session: &mut BuildSession) -> Result<()> {
        let program = session.identity();
        info!(program = %program, mode = ?session.mode(), "Starting build pipeline");

        for phase in &self.phases {
            let phase_name = phase.name();
            info!("Phase: {}", phase_name);
            self.notify(ProgressEvent::PhaseStarted {
                phase: phase_name.to_string(),
            });

            let phase_start = Instant::now();
            phase
                .execute(session)
                .with_context(|| format!("Phase {} failed for {}", phase_name, program))?;

            self.notify(ProgressEvent::PhaseComplete {
                phase: phase_name.to_string(),
                duration: phase_start.elapsed(),
            });
            debug!("Phase {} complete", phase_name);
        }

        let diagnostics = session.diagnostics();
        self.notify(ProgressEvent::ValidationComplete {
            warnings: diagnostics.warnings().count(),
            errors: diagnostics.errors().count(),
        });
        Ok(())
    }

    /// Register the session, run the pipeline and always tear the session down again
    pub fn run(
        &self,
        registry: &mut SessionRegistry,
        session: BuildSession,
    ) -> Result<BuildOutput> {
        let start = Instant::now();
        let id = session.identity();
        self.notify(ProgressEvent::Started {
            program: id.clone(),
        });

        let executed = registry
            .create(session)
            .context("Failed to start build session")
            .and_then(|session| self.execute(session));

        if let Err(err) = executed {
            // Only tear down a session this run registered.
            if !matches!(
                err.downcast_ref::<crate::error::C2cError>(),
                Some(crate::error::C2cError::SessionExists(_))
            ) {
                registry.destroy(&id).ok();
            }
            self.notify(ProgressEvent::Failed {
                error: format!("{:#}", err),
            });
            return Err(err);
        }

        let output = registry
            .destroy(&id)
            .context("Build session vanished")?
            .into_output()
            .context("Build session is incomplete")?;

        info!(
            program = %id,
            errors = output.diagnostics.errors().count(),
            warnings = output.diagnostics.warnings().count(),
            duration_ms = start.elapsed().as_millis(),
            "Build pipeline complete"
        );
        self.notify(ProgressEvent::Completed {
            artifacts: output.graph.artifact_count(),
            total_time: start.elapsed(),
        });
        Ok(output)
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new(Arc::new(RealFileSystem), Arc::new(Validator::new()))
    }
}
