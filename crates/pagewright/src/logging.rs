//! Logging setup.
//!
//! Everything in the crate logs through `tracing`. Resolution steps are
//! `debug`, swallowed faults and teardown failures are `warn`, session
//! start and stop are `info`. Install a subscriber once per process:
//!
//! ```rust,ignore
//! pagewright::logging::init_logging();
//! ```

use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::{MakeWriter, SubscriberBuilder};
use tracing_subscriber::EnvFilter;

use crate::result::{PagewrightError, PagewrightResult};

/// Environment variable read for the log filter
pub const LOG_ENV_VAR: &str = "PAGEWRIGHT_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from [`LOG_ENV_VAR`], falling back to `fallback`
fn env_filter(fallback: &str) -> PagewrightResult<EnvFilter> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => parse_filter(&directives),
        _ => parse_filter(fallback),
    }
}

fn parse_filter(directives: &str) -> PagewrightResult<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| PagewrightError::config(format!("invalid log filter '{directives}': {e}")))
}

fn builder<W>(filter: EnvFilter, writer: W) -> SubscriberBuilder<DefaultFields, Format, EnvFilter, W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
}

/// Install a global `fmt` subscriber, ignoring a subscriber already set.
///
/// The filter comes from `PAGEWRIGHT_LOG`, defaulting to `warn`.
pub fn init_logging() {
    let _ = try_init_logging(DEFAULT_FILTER);
}

/// Install a global `fmt` subscriber with `fallback` as the filter when
/// `PAGEWRIGHT_LOG` is unset.
///
/// # Errors
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn try_init_logging(fallback: &str) -> PagewrightResult<()> {
    builder(env_filter(fallback)?, std::io::stdout)
        .try_init()
        .map_err(|e| PagewrightError::config(format!("logging already initialised: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_goes_to_configured_writer() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = builder(parse_filter("warn").unwrap(), move || sink.clone()).finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("session started");
            tracing::warn!("teardown failed");
        });
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("teardown failed"), "{output}");
        assert!(!output.contains("session started"), "{output}");
    }

    #[test]
    fn test_parse_filter_accepts_directives() {
        assert!(parse_filter("pagewright=debug,warn").is_ok());
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        let err = parse_filter("pagewright=notalevel").unwrap_err();
        assert!(matches!(err, PagewrightError::Config { .. }));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging();
        init_logging();
        assert!(try_init_logging("info").is_err());
    }
}
