//! Authorization decisions and correlation identifiers.

use std::fmt;

use uuid::Uuid;

/// Principal reported on every Deny decision.
///
/// A denied decision never carries a derived identity.
pub const ANONYMOUS_PRINCIPAL: &str = "user";

/// Per-request identifier joining log lines and audit records.
///
/// Exactly one is minted per invocation, before any branching, so the
/// success and failure paths of a request log the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Mints a fresh random (v4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The request may proceed
    Allow,
    /// The caller receives an unauthorized response
    Deny,
}

impl Effect {
    /// The IAM policy spelling of the effect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized authorization decision.
///
/// Decisions are only built by the request context: an Allow requires an
/// authenticated context, and a Deny has no way to carry a subject. This
/// keeps the "Deny implies anonymous principal" invariant out of reach of
/// callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    effect: Effect,
    subject: Option<String>,
    resource: String,
    correlation_id: CorrelationId,
}

impl Decision {
    pub(crate) fn allow(
        subject: String,
        resource: String,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            effect: Effect::Allow,
            subject: Some(subject),
            resource,
            correlation_id,
        }
    }

    pub(crate) fn deny(resource: String, correlation_id: CorrelationId) -> Self {
        Self {
            effect: Effect::Deny,
            subject: None,
            resource,
            correlation_id,
        }
    }

    /// Allow or Deny.
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Returns `true` for Allow decisions.
    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// The subject on Allow, [`ANONYMOUS_PRINCIPAL`] on Deny.
    pub fn principal_id(&self) -> &str {
        self.subject.as_deref().unwrap_or(ANONYMOUS_PRINCIPAL)
    }

    /// The resource being authorized, verbatim from the request.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The request's correlation id, present on both outcomes.
    ///
    /// Use [`context_correlation_id`](Self::context_correlation_id) for what
    /// may be passed downstream.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// The correlation id forwarded to the backend: `Some` only on Allow.
    ///
    /// Denial context is logged, not passed downstream.
    pub fn context_correlation_id(&self) -> Option<CorrelationId> {
        match self.effect {
            Effect::Allow => Some(self.correlation_id),
            Effect::Deny => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn correlation_id_displays_as_hyphenated_uuid() {
        let id = CorrelationId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(Uuid::parse_str(&text).unwrap(), *id.as_uuid());
    }

    #[test]
    fn allow_carries_subject_and_context() {
        let id = CorrelationId::new();
        let decision = Decision::allow("user-123".to_string(), "arn:r".to_string(), id);

        assert!(decision.is_allowed());
        assert_eq!(decision.principal_id(), "user-123");
        assert_eq!(decision.resource(), "arn:r");
        assert_eq!(decision.context_correlation_id(), Some(id));
    }

    #[test]
    fn deny_is_anonymous_and_omits_context() {
        let id = CorrelationId::new();
        let decision = Decision::deny("arn:r".to_string(), id);

        assert_eq!(decision.effect(), Effect::Deny);
        assert_eq!(decision.principal_id(), ANONYMOUS_PRINCIPAL);
        assert_eq!(decision.correlation_id(), id);
        assert!(decision.context_correlation_id().is_none());
    }

    #[test]
    fn effect_spelling() {
        assert_eq!(Effect::Allow.to_string(), "Allow");
        assert_eq!(Effect::Deny.as_str(), "Deny");
    }
}
