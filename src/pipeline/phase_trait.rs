use crate::session::BuildSession;
use anyhow::Result;

/// One step of a build. Phases read earlier results from the session and store their own.
///
/// Data-shape problems are recorded on the session as diagnostics; an `Err`
/// aborts the whole build.
pub trait BuildPhase: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, session: &mut BuildSession) -> Result<()>;
}
