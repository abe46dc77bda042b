//! Logging setup
//!
//! Progress lines go to stderr through `tracing`. `ECS_TEMPLATE_LOG` takes
//! `EnvFilter` directives and overrides the verbosity flags.

use is_terminal::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding filter directives
pub const LOG_ENV: &str = "ECS_TEMPLATE_LOG";

/// Default level for a verbosity setting
pub fn level_for(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(quiet: bool, verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for(quiet, verbose)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(verbose > 1)
                .without_time(),
        )
        .with(filter)
        .try_init();
}
