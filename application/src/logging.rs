//! Logging bootstrap.

use std::{io, sync::OnceLock};

use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// [`log::Level`]s written to `stderr` rather than `stdout`.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Maximum [`log::Level`] of emitted events.
///
/// Stays [`log::Level::INFO`] until [`set_level()`] is called.
static LEVEL: OnceLock<log::Level> = OnceLock::new();

/// Installs the global [`tracing`] subscriber.
///
/// Spans and events up to the current level are written to `stdout`, while
/// warnings and errors go to `stderr`.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || !is_stderr(*meta.level())
                            && is_enabled(*meta.level())
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || is_stderr(*meta.level())
                            && is_enabled(*meta.level())
                })),
        )
        .init();
}

/// Sets the maximum [`log::Level`] of emitted events.
///
/// Returns `false` if the level has been set already.
pub fn set_level(level: log::Level) -> bool {
    LEVEL.set(level).is_ok()
}

/// Indicates whether events of the provided [`log::Level`] go to `stderr`.
fn is_stderr(level: log::Level) -> bool {
    STDERR_LEVELS.contains(&level)
}

/// Indicates whether events of the provided [`log::Level`] are emitted.
fn is_enabled(level: log::Level) -> bool {
    LEVEL.get().copied().unwrap_or(log::Level::INFO) >= level
}

#[cfg(test)]
mod spec {
    use tracing::Level;

    use super::{is_enabled, is_stderr};

    #[test]
    fn splits_levels_between_streams() {
        assert!(is_stderr(Level::ERROR));
        assert!(is_stderr(Level::WARN));
        assert!(!is_stderr(Level::INFO));
        assert!(!is_stderr(Level::TRACE));
    }

    #[test]
    fn defaults_to_info() {
        assert!(is_enabled(Level::ERROR));
        assert!(is_enabled(Level::INFO));
        assert!(!is_enabled(Level::DEBUG));
    }
}
