use crate::pipeline::phase_trait::BuildPhase;
use crate::session::BuildSession;
use crate::topology::TopologyExtractor;
use anyhow::Result;

pub struct ExtractPhase;

impl BuildPhase for ExtractPhase {
    fn name(&self) -> &'static str {
        "Extract"
    }

    fn execute(&self, session: &mut BuildSession) -> Result<()> {
        let (topology, diagnostics) =
            TopologyExtractor::new(session.mode()).extract(session.program());
        session.record(diagnostics);
        session.set_topology(topology);
        Ok(())
    }
}
