pub mod probe;
pub mod rules;
pub mod validator;

pub use probe::ProbeValidator;
pub use rules::{NonEmptyImageRule, UniqueArtifactNamesRule, ValidationRule};
pub use validator::Validator;
