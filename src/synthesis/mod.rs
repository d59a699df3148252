// Artifact synthesis
//
// Topology + resolved configuration in, renderer-neutral artifact graph out.

pub mod artifacts;
pub mod builder;
pub mod image;
pub mod naming;
pub mod synthesizer;

pub use artifacts::{
    ArtifactGraph, ArtifactKind, AutoscalerModel, ConfigMapModel, ContainerPort, JobModel,
    MountedData, NetworkEndpointModel, ProbeModel, Runnable, SecretModel, VolumeMount,
    WorkloadModel,
};
pub use builder::{ArtifactGraphBuilder, MergeOutcome};
pub use image::{BuildModel, CopyInstruction};
pub use naming::{artifact_name, sanitize, Role};
pub use synthesizer::ArtifactSynthesizer;
