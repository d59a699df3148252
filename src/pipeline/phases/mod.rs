pub mod extract;
pub mod resolve;
pub mod synthesize;
pub mod validate;

pub use extract::ExtractPhase;
pub use resolve::ResolveConfigPhase;
pub use synthesize::SynthesizePhase;
pub use validate::ValidatePhase;
