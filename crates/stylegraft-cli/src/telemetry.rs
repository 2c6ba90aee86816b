//! Log initialization.
//!
//! Controlled by `STYLEGRAFT_LOG`:
//! - unset or empty → no subscriber (logging disabled)
//! - `"stderr"` → JSON events to stderr
//! - anything else → compact human-readable events to stderr
//!
//! Levels follow `RUST_LOG` and default to `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable selecting the log sink.
pub const LOG_ENV: &str = "STYLEGRAFT_LOG";

/// Install the subscriber selected by [`LOG_ENV`].
pub fn init() {
    let sink = std::env::var(LOG_ENV).ok();
    match sink.as_deref() {
        None | Some("") => {}
        Some("stderr") => init_json(),
        Some(_) => init_compact(),
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// JSON events to stderr, with merge spans reported on close.
fn init_json() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .init();
}

fn init_compact() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
