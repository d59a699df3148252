//! Tracing subscriber setup
//!
//! Everything is written to stderr; stdout carries the generated artifacts.
//! A `RUST_LOG` filter is honoured and the configured level is added on top
//! as a `c2c=<level>` directive.
//!
//! - `C2C_LOG_LEVEL`: trace, debug, info, warn or error (default warn)
//! - `C2C_LOG_JSON`: `true` for JSON lines
//!
//! ```no_run
//! c2c::util::logging::init_from_env();
//! tracing::info!(program = "hello", "Starting build");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "C2C_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "C2C_LOG_JSON";

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub use_json: bool,
    /// Show the emitting module, e.g. `c2c::synthesis`
    pub include_target: bool,
    /// Show file and line of each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Defaults overlaid with `C2C_LOG_LEVEL` and `C2C_LOG_JSON`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = env::var(LOG_LEVEL_ENV) {
            config.level = parse_level(&level);
        }
        if let Some(json) = env::var(LOG_JSON_ENV).ok().and_then(|v| v.parse().ok()) {
            config.use_json = json;
        }
        config
    }
}

/// Level names are matched case-insensitively. Anything unrecognised means WARN.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("c2c: unknown log level '{}', using warn", other);
            Level::WARN
        }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = format!("c2c={}", config.level).parse() {
            filter = filter.add_directive(directive);
        }

        let (json, plain) = if config.use_json {
            (Some(fmt::layer().json()), None)
        } else {
            (None, Some(fmt::layer()))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(json.map(|layer| {
                layer
                    .with_writer(std::io::stderr)
                    .with_target(config.include_target)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
            }))
            .with(plain.map(|layer| {
                layer
                    .with_writer(std::io::stderr)
                    .with_target(config.include_target)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
            }))
            .init();
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use yare::parameterized;

    #[parameterized(
        trace = { "trace", Level::TRACE },
        mixed_case = { "Debug", Level::DEBUG },
        upper = { "INFO", Level::INFO },
        warning = { "warning", Level::WARN },
        error = { " error ", Level::ERROR },
        unknown = { "loud", Level::WARN },
        empty = { "", Level::WARN },
    )]
    fn test_parse_level(name: &str, expected: Level) {
        assert_eq!(parse_level(name), expected);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(LOG_LEVEL_ENV, "debug");
        env::set_var(LOG_JSON_ENV, "true");
        let config = LoggingConfig::from_env();
        env::remove_var(LOG_LEVEL_ENV);
        env::remove_var(LOG_JSON_ENV);

        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
        assert!(!config.include_location);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_malformed_json_flag() {
        env::remove_var(LOG_LEVEL_ENV);
        env::set_var(LOG_JSON_ENV, "yes please");
        let config = LoggingConfig::from_env();
        env::remove_var(LOG_JSON_ENV);

        assert_eq!(config.level, Level::WARN);
        assert!(!config.use_json);
    }
}
