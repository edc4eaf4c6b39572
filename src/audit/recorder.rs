//! Fire-and-forget audit writes.
//!
//! The recorder detaches each write from the request that produced it. The
//! request path hands over owned data and returns immediately; the write
//! runs on a tracked task so the host can drain in-flight writes before the
//! process exits.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::task::TaskTracker;

use super::{AuditRecord, AuditStore};
use crate::decision::CorrelationId;

/// Dispatches break-glass index writes without blocking the caller.
///
/// # Failure Isolation
///
/// A failed write is logged with the subject, correlation id, and error,
/// and then dropped. It is never retried, never returned, and never touches
/// the decision that triggered it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gateway_authorizer::audit::{AuditRecorder, InMemoryAuditStore};
/// use gateway_authorizer::CorrelationId;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = InMemoryAuditStore::new("break-glass-index");
/// let recorder = AuditRecorder::new(store.clone());
///
/// recorder.record("user-123".to_string(), CorrelationId::new());
///
/// recorder.shutdown(Duration::from_secs(1)).await;
/// assert_eq!(store.len(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
    tasks: TaskTracker,
}

impl AuditRecorder {
    /// Creates a recorder writing to `store`.
    pub fn new(store: impl AuditStore + 'static) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a recorder over an already shared store client.
    pub fn from_shared(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            tasks: TaskTracker::new(),
        }
    }

    /// Dispatches a write of `subject -> correlation_id` and returns at once.
    ///
    /// Must be called from within a Tokio runtime. The record's timestamp
    /// and expiry are taken when the task runs, not when it is dispatched.
    pub fn record(&self, subject: String, correlation_id: CorrelationId) {
        let store = Arc::clone(&self.store);

        self.tasks.spawn(async move {
            let record = AuditRecord::new(&subject, correlation_id, Utc::now());

            match store.put(record).await {
                Ok(()) => {
                    tracing::debug!(
                        correlation_id = %correlation_id,
                        subject = %subject,
                        "wrote break-glass index entry"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        subject = %subject,
                        error = %err,
                        "Failed to write to break-glass index"
                    );
                }
            }
        });
    }

    /// Returns the number of writes still running.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Closes the task tracker and waits up to `grace` for in-flight writes
    /// to settle.
    ///
    /// Writes still pending after `grace` are reported as missed audit
    /// entries and left to be dropped with the runtime. This never fails.
    /// Writes dispatched after shutdown are still tracked, so calling
    /// `shutdown` again waits for them too.
    pub async fn shutdown(&self, grace: Duration) {
        self.tasks.close();

        if tokio::time::timeout(grace, self.tasks.wait()).await.is_err() {
            tracing::warn!(
                pending = self.tasks.len(),
                grace_ms = grace.as_millis() as u64,
                "audit writes still pending at shutdown; entries will be missed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditStore;
    use crate::error::AuditWriteError;
    use crate::logging::capture::CapturedLogs;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore {
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn put(&self, _record: AuditRecord) -> Result<(), AuditWriteError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AuditWriteError::Unavailable("simulated outage".to_string()))
        }
    }

    struct StuckStore;

    #[async_trait]
    impl AuditStore for StuckStore {
        async fn put(&self, _record: AuditRecord) -> Result<(), AuditWriteError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn record_writes_one_entry() {
        let store = InMemoryAuditStore::new("t");
        let recorder = AuditRecorder::new(store.clone());
        let id = CorrelationId::new();

        recorder.record("user-123".to_string(), id);
        recorder.shutdown(Duration::from_secs(1)).await;

        let records = store.query_subject("user-123", Utc::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].correlation_id(), id);
        assert_eq!(records[0].subject_key(), "USER#user-123");
    }

    #[tokio::test]
    async fn failed_write_is_attempted_once_and_swallowed() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let recorder = AuditRecorder::new(FailingStore {
            attempts: Arc::clone(&attempts),
        });

        recorder.record("user-123".to_string(), CorrelationId::new());
        recorder.shutdown(Duration::from_secs(1)).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.in_flight(), 0);
    }

    #[tokio::test]
    async fn shutdown_gives_up_after_grace() {
        let recorder = AuditRecorder::new(StuckStore);

        recorder.record("user-123".to_string(), CorrelationId::new());
        assert_eq!(recorder.in_flight(), 1);

        recorder.shutdown(Duration::from_millis(20)).await;

        assert_eq!(recorder.in_flight(), 1);
    }

    #[tokio::test]
    async fn missed_entries_are_reported_at_shutdown() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let recorder = AuditRecorder::new(StuckStore);

        recorder.record("user-123".to_string(), CorrelationId::new());
        recorder.record("user-456".to_string(), CorrelationId::new());
        recorder.shutdown(Duration::from_millis(20)).await;

        let warnings = logs.at_level("WARN");
        assert_eq!(warnings.len(), 1, "warnings: {warnings:?}");
        assert_eq!(warnings[0]["pending"], 2);
        assert_eq!(warnings[0]["grace_ms"], 20);
        assert_eq!(
            warnings[0]["message"],
            "audit writes still pending at shutdown; entries will be missed"
        );
    }

    #[tokio::test]
    async fn clean_shutdown_reports_nothing() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let recorder = AuditRecorder::new(InMemoryAuditStore::new("t"));

        recorder.record("user-123".to_string(), CorrelationId::new());
        recorder.shutdown(Duration::from_secs(1)).await;

        assert!(logs.at_level("WARN").is_empty());
        assert!(logs.at_level("ERROR").is_empty());
    }

    #[tokio::test]
    async fn failed_write_is_logged_with_its_context() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let id = CorrelationId::new();
        let recorder = AuditRecorder::new(FailingStore {
            attempts: Arc::new(AtomicUsize::new(0)),
        });

        recorder.record("user-123".to_string(), id);
        recorder.shutdown(Duration::from_secs(1)).await;

        let errors = logs.at_level("ERROR");
        assert_eq!(errors.len(), 1, "errors: {errors:?}");
        assert_eq!(errors[0]["message"], "Failed to write to break-glass index");
        assert_eq!(errors[0]["correlation_id"], id.to_string());
        assert_eq!(errors[0]["subject"], "user-123");
    }

    #[tokio::test]
    async fn record_does_not_wait_for_the_store() {
        let recorder = AuditRecorder::new(StuckStore);

        let dispatched = tokio::time::timeout(Duration::from_millis(100), async {
            recorder.record("user-123".to_string(), CorrelationId::new());
        })
        .await;

        assert!(dispatched.is_ok());
    }
}
