use crate::pipeline::phase_trait::BuildPhase;
use crate::session::BuildSession;
use crate::validation::{ProbeValidator, Validator};
use anyhow::Result;
use std::sync::Arc;

/// Probe cross-checks against the topology, then graph rules
pub struct ValidatePhase {
    validator: Arc<Validator>,
}

impl ValidatePhase {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

impl BuildPhase for ValidatePhase {
    fn name(&self) -> &'static str {
        "Validate"
    }

    fn execute(&self, session: &mut BuildSession) -> Result<()> {
        let probe_diagnostics = {
            let topology = session.topology()?;
            let config = session.config()?;
            ProbeValidator::new(topology).validate(config.deployment.probes())
        };
        session.record(probe_diagnostics);

        let graph_diagnostics = self.validator.validate(session.graph_mut()?);
        session.record(graph_diagnostics);
        Ok(())
    }
}
