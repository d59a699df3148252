pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, BuildModeArg, CliArgs, Commands, OutputFormatArg};
pub use handlers::{handle_generate, handle_validate};
pub use output::{OutputFormat, OutputFormatter};
