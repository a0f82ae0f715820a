//! Diagnostic logging through `tracing`.
//!
//! Diagnostics go to stderr so that command results on stdout stay
//! pipeable. `RUST_LOG` directives take precedence over the level chosen
//! from `-v`/`-q`.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The default level for a `-v` count.
pub fn level(verbosity: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Later calls have no effect.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(level(verbosity, quiet).into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 3)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level(0, false), Level::WARN);
        assert_eq!(level(1, false), Level::INFO);
        assert_eq!(level(2, false), Level::DEBUG);
        assert_eq!(level(7, false), Level::TRACE);
        assert_eq!(level(3, true), Level::ERROR);
    }

    #[test]
    fn init_twice() {
        init(0, false);
        init(2, false);
        tracing::debug!("Logging is initialised");
    }
}
