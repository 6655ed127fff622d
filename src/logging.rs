//! Tracing setup for the command-line binary. Logs go to stderr so tables and
//! JSON on stdout stay machine-readable.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter directive for this crate at `level`, everything else at `warn`.
pub fn filter_directive(level: &str) -> String {
    format!("warn,quality_chain={level}")
}

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init_tracing(level: Option<&str>) {
    let level = level.unwrap_or(DEFAULT_LOG_LEVEL);
    let filter = EnvFilter::try_new(filter_directive(level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(DEFAULT_LOG_LEVEL)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_scopes_level_to_this_crate() {
        assert_eq!(filter_directive("debug"), "warn,quality_chain=debug");
    }

    #[test]
    fn repeated_init_does_not_panic() {
        init_tracing(Some("info"));
        init_tracing(Some("not-a-level"));
    }
}
