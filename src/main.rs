use c2c::cli::commands::{CliArgs, Commands};
use c2c::cli::handlers::{handle_generate, handle_validate};
use c2c::util::logging::{self, LoggingConfig};
use c2c::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("c2c v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(build_args) => handle_generate(build_args),
        Commands::Validate(build_args) => handle_validate(build_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    if let Some(level) = &args.log_level {
        config.level = logging::parse_level(level);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    config.include_target = true;

    logging::init_logging(config);
}
