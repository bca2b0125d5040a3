use std::str::FromStr;

use env_logger::{Builder, Env};
use log::LevelFilter;

use crate::config::LoggingConfig;

fn level(value: &str, fallback: LevelFilter) -> LevelFilter {
    LevelFilter::from_str(value.trim()).unwrap_or(fallback)
}

/// Build the process logger from configuration. `RUST_LOG`, when set,
/// is applied on top of the configured levels.
pub fn builder(config: &LoggingConfig) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level(&config.level, LevelFilter::Info))
        .filter_module("sqlx", level(&config.sqlx_level, LevelFilter::Warn))
        .parse_env(Env::default());
    builder
}

/// Install the logger once; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    if builder(config).try_init().is_err() {
        log::debug!("Logger already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing_falls_back() {
        assert_eq!(level("debug", LevelFilter::Info), LevelFilter::Debug);
        assert_eq!(level(" WARN ", LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(level("loud", LevelFilter::Info), LevelFilter::Info);
    }
}
