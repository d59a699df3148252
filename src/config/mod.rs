// Deployment configuration
//
// Sources, lowest precedence first: compiled-in defaults, the project's
// `Cloud.toml`, then `C2C_*` environment variables.

pub mod content;
pub mod env;
pub mod layer;
pub mod project;
pub mod resolver;

pub use content::ContentBlob;
pub use env::EnvOverrides;
pub use layer::{
    AutoscalingConfig, ConfigLayer, CopyFileSpec, DeploymentConfig, ImageCoordinates, MountKind,
    MountSpec, ProbeKind, ProbeSpec, ResolvedMount, ResourceQuantities, ResourceRequirements,
    Resources,
};
pub use project::{ProjectConfig, PROJECT_CONFIG_FILE};
pub use resolver::{ConfigResolver, MaterialStore, ResolvedConfig};
