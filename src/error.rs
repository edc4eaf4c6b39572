use std::fmt;

/// Why a request was denied.
///
/// The kind and reason are retained for local diagnostics only. Every denial
/// collapses to the same opaque Deny response at the gateway boundary.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {reason}")]
pub struct Denial {
    /// The category of denial
    pub kind: DenialKind,
    /// Human-readable internal reason, never sent to the caller
    pub reason: String,
}

impl Denial {
    /// Creates a new denial.
    pub fn new(kind: DenialKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// No bearer credential, or a malformed header.
    pub fn missing_credential() -> Self {
        Self::new(DenialKind::MissingCredential, "no bearer token in request")
    }

    /// The validator rejected the credential.
    pub fn invalid_credential(err: &ValidationError) -> Self {
        Self::new(DenialKind::InvalidCredential, err.to_string())
    }

    /// Anything else went wrong while deciding.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(DenialKind::UnexpectedInternalFailure, reason)
    }
}

/// Denial categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// No or malformed bearer token; the validator was never called
    MissingCredential,
    /// The validator rejected the token for any reason
    InvalidCredential,
    /// Any other failure during decision construction (fail-closed)
    UnexpectedInternalFailure,
}

impl fmt::Display for DenialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialKind::MissingCredential => write!(f, "missing_credential"),
            DenialKind::InvalidCredential => write!(f, "invalid_credential"),
            DenialKind::UnexpectedInternalFailure => write!(f, "unexpected_internal_failure"),
        }
    }
}

/// Failures reported by a credential validator.
///
/// The decision engine treats every variant the same way (Deny). The
/// variants exist so logs can tell an expired token from a key-fetch outage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Not a structurally valid token
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Past its `exp`
    #[error("token expired")]
    Expired,

    /// Signature does not verify against the resolved key
    #[error("signature verification failed")]
    InvalidSignature,

    /// `iss` is not the configured issuer
    #[error("issuer mismatch")]
    IssuerMismatch,

    /// `aud` does not contain the configured audience
    #[error("audience mismatch")]
    AudienceMismatch,

    /// No key for the token's `kid`
    #[error("no verification key for kid {0:?}")]
    UnknownKey(Option<String>),

    /// Verification keys could not be fetched
    #[error("failed to fetch verification keys: {0}")]
    KeyFetch(String),

    /// The validator exceeded its deadline
    #[error("validation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Any other rejection
    #[error("token rejected: {0}")]
    Other(String),
}

/// A failed write to the audit store.
///
/// Only ever logged by the audit recorder. It never reaches the decision.
#[derive(Debug, thiserror::Error)]
pub enum AuditWriteError {
    /// The store could not be reached
    #[error("audit store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write due to load
    #[error("audit write throttled")]
    Throttled,

    /// The store rejected the item
    #[error("audit item rejected: {0}")]
    Rejected(String),
}

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// `LOG_LEVEL` is not a known level
    #[error("invalid log level {0:?}, expected one of DEBUG, INFO, WARN, ERROR")]
    InvalidLogLevel(String),

    /// `AUDIT_STORE` is not a known backend
    #[error("invalid audit store {0:?}, expected dynamodb or memory")]
    InvalidAuditStore(String),

    /// A millisecond setting is not a number
    #[error("environment variable {name} is not a valid number: {value:?}")]
    InvalidNumber {
        /// The variable name
        name: &'static str,
        /// The rejected value
        value: String,
    },
}
