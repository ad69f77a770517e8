//! Log output for the command-line tool

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_DIRECTIVE: &str = "bracket_draw=info";

/// Filter directive for the given verbosity
fn directive(verbose: bool) -> &'static str {
    if verbose {
        "bracket_draw=debug"
    } else {
        DEFAULT_DIRECTIVE
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flag;
/// stdout stays free for reports.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose)));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_by_verbosity() {
        assert_eq!(directive(false), "bracket_draw=info");
        assert_eq!(directive(true), "bracket_draw=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
    }
}
