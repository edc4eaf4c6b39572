//! In-memory audit store.
//!
//! A TTL-honouring store for local runs and tests. Production deployments
//! put an expiring key-value table behind [`AuditStore`] instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::record::subject_key;
use super::{AuditRecord, AuditStore};
use crate::error::AuditWriteError;

/// Thread-safe in-memory audit store keyed by subject key.
///
/// Expired records are invisible to reads and dropped by
/// [`evict_expired`](Self::evict_expired), mirroring a store-native TTL.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use gateway_authorizer::audit::{AuditRecord, AuditStore, InMemoryAuditStore};
/// use gateway_authorizer::CorrelationId;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = InMemoryAuditStore::new("break-glass-index");
/// let id = CorrelationId::new();
///
/// store.put(AuditRecord::new("user-123", id, Utc::now())).await.unwrap();
///
/// let found = store.query_subject("user-123", Utc::now());
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].correlation_id(), id);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryAuditStore {
    table_name: String,
    items: Arc<Mutex<HashMap<String, Vec<AuditRecord>>>>,
}

impl InMemoryAuditStore {
    /// Creates an empty store standing in for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            items: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The table this store stands in for.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the unexpired records for `subject`, oldest first.
    pub fn query_subject(&self, subject: &str, now: DateTime<Utc>) -> Vec<AuditRecord> {
        self.lock()
            .get(&subject_key(subject))
            .map(|records| {
                records
                    .iter()
                    .filter(|r| !r.is_expired(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns a snapshot of every stored record, expired or not.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.lock().values().flatten().cloned().collect()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every record whose retention window has passed.
    pub fn evict_expired(&self, now: DateTime<Utc>) {
        let mut items = self.lock();
        for records in items.values_mut() {
            records.retain(|r| !r.is_expired(now));
        }
        items.retain(|_, records| !records.is_empty());
    }

    // A poisoned lock only means another writer panicked mid-push; the map
    // itself is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<AuditRecord>>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn put(&self, record: AuditRecord) -> Result<(), AuditWriteError> {
        tracing::debug!(
            table = %self.table_name,
            subject_key = %record.subject_key(),
            correlation_id = %record.correlation_id(),
            "writing audit record"
        );
        self.lock()
            .entry(record.subject_key().to_string())
            .or_default()
            .push(record);
        Ok(())
    }
}
