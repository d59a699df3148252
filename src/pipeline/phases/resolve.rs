use crate::config::ConfigResolver;
use crate::fs::FileSystem;
use crate::pipeline::phase_trait::BuildPhase;
use crate::session::BuildSession;
use anyhow::Result;
use std::sync::Arc;

/// Overlays defaults, project document and environment, then loads mount and secure-socket files
pub struct ResolveConfigPhase {
    fs: Arc<dyn FileSystem>,
}

impl ResolveConfigPhase {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl BuildPhase for ResolveConfigPhase {
    fn name(&self) -> &'static str {
        "ResolveConfig"
    }

    fn execute(&self, session: &mut BuildSession) -> Result<()> {
        let resolver = ConfigResolver::new(self.fs.clone(), session.project_dir());
        let (config, diagnostics) = resolver.resolve_program(
            session.program(),
            session.project(),
            session.env(),
            session.topology()?,
        );
        session.record(diagnostics);
        session.set_config(config);
        Ok(())
    }
}
