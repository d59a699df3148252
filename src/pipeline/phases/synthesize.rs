use crate::pipeline::phase_trait::BuildPhase;
use crate::session::BuildSession;
use crate::synthesis::{ArtifactSynthesizer, BuildModel};
use anyhow::Result;

pub struct SynthesizePhase;

impl BuildPhase for SynthesizePhase {
    fn name(&self) -> &'static str {
        "Synthesize"
    }

    fn execute(&self, session: &mut BuildSession) -> Result<()> {
        let topology = session.topology()?;
        let config = session.config()?;

        let synthesizer = ArtifactSynthesizer::new(session.program(), session.mode());
        let (graph, diagnostics) = synthesizer.synthesize(topology, config);
        let build = BuildModel::from_config(session.program(), topology, &config.deployment);

        session.record(diagnostics);
        session.set_graph(graph);
        session.set_build(build);
        Ok(())
    }
}
