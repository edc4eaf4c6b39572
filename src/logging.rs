//! Structured logging.
//!
//! [`RequestLog`] stamps the request's correlation id on every event, and
//! [`init`] installs the process-wide JSON subscriber.

use std::fmt;

use crate::config::LogLevel;
use crate::decision::CorrelationId;

/// A request-scoped logger.
///
/// `RequestLog` is obtained from `RequestCtx::log()` and is lifetime-bound
/// to the context. Every event it emits carries the request's
/// `correlation_id`, and the `subject` once the request is authenticated, so
/// the allow and deny paths of one request can be joined in the log store.
///
/// Credentials are redacted when logged due to their `Debug` and `Display`
/// implementations.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    correlation_id: CorrelationId,
    subject: Option<&'a str>,
}

impl<'a> RequestLog<'a> {
    pub(crate) fn new(correlation_id: CorrelationId, subject: Option<&'a str>) -> Self {
        Self {
            correlation_id,
            subject,
        }
    }

    /// Returns the correlation id stamped on every event.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Logs an info-level message.
    ///
    /// ```no_run
    /// # use gateway_authorizer::logging::RequestLog;
    /// # fn example(log: &RequestLog<'_>) {
    /// log.info(format_args!("Starting authorization for request."));
    /// # }
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(correlation_id = %self.correlation_id, subject = self.subject, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(correlation_id = %self.correlation_id, subject = self.subject, "{}", args);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(correlation_id = %self.correlation_id, subject = self.subject, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(correlation_id = %self.correlation_id, subject = self.subject, "{}", args);
    }
}

/// Installs the process-wide JSON log subscriber.
///
/// Each event is written to stderr as one JSON object with `timestamp`,
/// `level`, the message, and its structured fields. Events below `level` are
/// discarded. Calling this more than once is harmless: later calls keep the
/// subscriber that is already installed.
pub fn init(level: LogLevel) {
    let installed = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_max_level(level.as_filter())
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = installed {
        tracing::debug!(error = %err, "log subscriber already installed");
    }
}

/// In-memory JSON log capture for tests asserting on emitted events.
#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;
    use tracing::subscriber::DefaultGuard;

    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        /// Routes this thread's events into the buffer until the guard drops.
        pub(crate) fn install(&self) -> DefaultGuard {
            let sink = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .json()
                .flatten_event(true)
                .with_max_level(tracing::Level::DEBUG)
                .with_writer(move || sink.clone())
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        pub(crate) fn at_level(&self, level: &str) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str::<Value>(line).unwrap())
                .filter(|entry| entry["level"] == level)
                .collect()
        }
    }
}
