//! Audit record schema and its typed store attributes.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::decision::CorrelationId;

/// Prefix namespacing subject keys, so the store can be range-queried by subject.
pub const SUBJECT_KEY_PREFIX: &str = "USER#";

/// How long a record lives before the store expires it.
pub const RETENTION: chrono::Duration = chrono::Duration::hours(24);

/// A typed store attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// A string attribute
    S(String),
    /// A number attribute, carried in its decimal string form
    N(String),
}

/// A `subject -> correlation id` fact for incident investigation.
///
/// # Safety Invariants
///
/// - Only built for allowed requests (a denied request has no subject)
/// - Carries no credential material, only the subject and the correlation id
/// - `expires_at` is exactly [`RETENTION`] after `timestamp`
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use gateway_authorizer::audit::AuditRecord;
/// use gateway_authorizer::CorrelationId;
///
/// let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let record = AuditRecord::new("user-123", CorrelationId::new(), now);
///
/// assert_eq!(record.subject_key(), "USER#user-123");
/// assert_eq!(record.expires_at(), now.timestamp() + 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    subject_key: String,
    correlation_id: CorrelationId,
    timestamp: DateTime<Utc>,
    expires_at: i64,
}

impl AuditRecord {
    /// Builds the record for `subject` written at `now`.
    pub fn new(subject: &str, correlation_id: CorrelationId, now: DateTime<Utc>) -> Self {
        Self {
            subject_key: subject_key(subject),
            correlation_id,
            timestamp: now,
            expires_at: (now + RETENTION).timestamp(),
        }
    }

    /// The namespaced subject key (`USER#<subject>`).
    pub fn subject_key(&self) -> &str {
        &self.subject_key
    }

    /// The subject without its namespace prefix.
    pub fn subject(&self) -> &str {
        self.subject_key
            .strip_prefix(SUBJECT_KEY_PREFIX)
            .unwrap_or(&self.subject_key)
    }

    /// The correlation id of the allowed request.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// When the write was performed.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Expiry in epoch seconds, read natively by the store's TTL feature.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Returns `true` once the retention window has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }

    /// The store item as named, typed attributes.
    ///
    /// ```text
    /// userId        S  USER#user-123
    /// timestamp     S  2024-05-01T12:00:00.000Z
    /// correlationId S  <uuid>
    /// ttl           N  1714651200
    /// ```
    pub fn attributes(&self) -> [(&'static str, Attribute); 4] {
        [
            ("userId", Attribute::S(self.subject_key.clone())),
            (
                "timestamp",
                Attribute::S(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            ("correlationId", Attribute::S(self.correlation_id.to_string())),
            ("ttl", Attribute::N(self.expires_at.to_string())),
        ]
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditRecord[subject_key={}, correlation_id={}, timestamp={}, expires_at={}]",
            self.subject_key,
            self.correlation_id,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.expires_at
        )
    }
}

/// Namespaces a subject for use as a store key.
pub(crate) fn subject_key(subject: &str) -> String {
    format!("{SUBJECT_KEY_PREFIX}{subject}")
}
