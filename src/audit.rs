//! The break-glass audit index.
//!
//! This module provides:
//! - `AuditRecord`: the `subject -> correlation id` fact and its store item
//! - `AuditStore`: the boundary to an expiring key-value store
//! - `DynamoAuditStore`: the production store, a DynamoDB table with TTL
//! - `InMemoryAuditStore`: a TTL-honouring in-process store
//! - `AuditRecorder`: fire-and-forget, failure-isolated writes
//!
//! Records are only written for allowed requests, expire after a fixed
//! 24-hour retention window, and are never deleted explicitly.

mod dynamo;
mod record;
mod recorder;
mod store;
mod trail;

pub use dynamo::DynamoAuditStore;
pub use record::{Attribute, AuditRecord, RETENTION, SUBJECT_KEY_PREFIX};
pub use recorder::AuditRecorder;
pub use store::AuditStore;
pub use trail::InMemoryAuditStore;
