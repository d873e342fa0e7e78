//! Tracing subscriber setup for the `tb` binary.
//!
//! Events go to stderr so stdout stays parseable.

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_LEVEL;

/// Environment variable selecting JSON log lines when set to `json`.
pub const LOG_FORMAT_ENV: &str = "TB_LOG_FORMAT";

/// Build a filter from a directive, falling back to the default level when
/// the directive does not parse.
pub fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Returns true if `TB_LOG_FORMAT` asks for JSON output.
pub fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(directive: &str, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(directive))
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(false).try_init()
    };
}
