//! Logging setup.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for
//! reports.
//!
//! Filter precedence (highest to lowest):
//! 1. `DOCSNAP_LOG` (EnvFilter directives, e.g. `docsnap::tree=debug`)
//! 2. CLI verbosity (`-q`, `-v`, `-vv`)
//! 3. `warn`
//!
//! `DOCSNAP_LOG_FORMAT=json` switches to one JSON object per line.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "DOCSNAP_LOG";

/// Environment variable selecting `text` or `json` log lines.
pub const LOG_FORMAT_ENV: &str = "DOCSNAP_LOG_FORMAT";

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verbosity {
    pub quiet: bool,
    pub verbose: u8,
}

impl Verbosity {
    /// Default filter directive for this verbosity.
    pub fn level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(verbosity: Verbosity) -> bool {
    let filter = build_env_filter(verbosity);
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = Registry::default().with(filter);
    let installed = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.is_ok()
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(verbosity.level()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::default().level(), "warn");
        assert_eq!(Verbosity { quiet: false, verbose: 1 }.level(), "debug");
        assert_eq!(Verbosity { quiet: false, verbose: 4 }.level(), "trace");
        assert_eq!(Verbosity { quiet: true, verbose: 2 }.level(), "error");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Verbosity::default());
        assert!(!init_logging(Verbosity::default()));
    }
}
