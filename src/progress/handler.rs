use std::time::Duration;

/// Milestones of one pipeline run, in the order they occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { program: String },
    PhaseStarted { phase: String },
    PhaseComplete { phase: String, duration: Duration },
    /// Totals over every diagnostic recorded so far
    ValidationComplete { warnings: usize, errors: usize },
    /// Build finished, possibly with ERROR diagnostics
    Completed { artifacts: usize, total_time: Duration },
    /// Build aborted before producing output
    Failed { error: String },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
