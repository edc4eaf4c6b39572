//! The audit store boundary.

use async_trait::async_trait;

use super::AuditRecord;
use crate::error::AuditWriteError;

/// An external key-value store with per-item expiration.
///
/// Implementations write one item per call, keyed by
/// [`AuditRecord::subject_key`], and let the store's native TTL mechanism
/// remove it at [`AuditRecord::expires_at`]. Retry and backoff, if any, are
/// the store client's concern: the recorder calls `put` exactly once.
///
/// The store client is created once per process and shared by every request.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Writes `record`.
    async fn put(&self, record: AuditRecord) -> Result<(), AuditWriteError>;
}
