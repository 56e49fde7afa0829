//! Logging Configuration

use tracing_subscriber::EnvFilter;

const LOG_LEVEL_ENV: &str = "STASHKIT_LOG_LEVEL";

fn resolve_default_level(verbose: bool) -> log::LevelFilter {
    let fallback = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    match std::env::var(LOG_LEVEL_ENV) {
        Ok(val) => parse_log_level(&val).unwrap_or_else(|| {
            eprintln!(
                "Warning: Invalid {} '{}', falling back to default",
                LOG_LEVEL_ENV, val
            );
            fallback
        }),
        Err(_) => fallback,
    }
}

pub fn parse_log_level(value: &str) -> Option<log::LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(log::LevelFilter::Trace),
        "debug" => Some(log::LevelFilter::Debug),
        "info" => Some(log::LevelFilter::Info),
        "warn" => Some(log::LevelFilter::Warn),
        "error" => Some(log::LevelFilter::Error),
        "off" => Some(log::LevelFilter::Off),
        _ => None,
    }
}

pub fn level_to_str(level: log::LevelFilter) -> &'static str {
    match level {
        log::LevelFilter::Trace => "trace",
        log::LevelFilter::Debug => "debug",
        log::LevelFilter::Info => "info",
        log::LevelFilter::Warn => "warn",
        log::LevelFilter::Error => "error",
        log::LevelFilter::Off => "off",
    }
}

/// Install the stderr subscriber. Records from the `log` facade used by the
/// libraries are bridged into it.
pub fn init_logging(verbose: bool) -> log::LevelFilter {
    let level = resolve_default_level(verbose);
    let filter = EnvFilter::new(level_to_str(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
    {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(parse_log_level(" DEBUG "), Some(log::LevelFilter::Debug));
        assert_eq!(parse_log_level("off"), Some(log::LevelFilter::Off));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn level_names_parse_back() {
        for level in [
            log::LevelFilter::Trace,
            log::LevelFilter::Warn,
            log::LevelFilter::Off,
        ] {
            assert_eq!(parse_log_level(level_to_str(level)), Some(level));
        }
    }
}
