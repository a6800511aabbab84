use std::env;

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::constants::LAMBDA_FUNCTION_NAME_ENV;

/// Level used when `RUST_LOG` is unset
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter_for(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose).as_str()))
}

/// Install the global subscriber writing to stderr
///
/// Handler output goes to stdout under `invoke`, so logs must never share it.
pub fn init(verbose: u8) -> Result<()> {
    let in_lambda = env::var_os(LAMBDA_FUNCTION_NAME_ENV).is_some();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(verbose >= 2)
        .with_file(verbose >= 3)
        .with_line_number(verbose >= 3)
        .compact();

    let installed = if in_lambda {
        builder.without_time().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("could not install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(3), Level::TRACE);
        assert_eq!(level_for(9), Level::TRACE);
    }
}
