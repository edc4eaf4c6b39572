use std::marker::PhantomData;

use crate::decision::{CorrelationId, Decision};
use crate::error::{Denial, DenialKind};
use crate::logging::RequestLog;
use crate::state::{Authed, Unauthed};
use crate::validator::ClaimSet;

/// Per-request decision context.
///
/// `RequestCtx<S>` is generic over its authentication state:
/// - `RequestCtx<Unauthed>`: correlation id and resource, no subject
/// - `RequestCtx<Authed>`: additionally holds a validated claim set
///
/// # Type-State Progression
///
/// ```text
/// RequestCtx<Unauthed> --authenticate--> RequestCtx<Authed> --allow--> Decision (Allow)
///          |
///          +------------deny------------> Decision (Deny)
/// ```
///
/// Only `RequestCtx<Authed>` can produce an Allow, and `deny` is only
/// available before authentication, so a Deny can never carry a subject.
///
/// # Construction
///
/// Contexts are created by the decision engine, which mints the
/// correlation id before anything else happens to the request.
#[derive(Debug, Clone)]
pub struct RequestCtx<S = Unauthed> {
    correlation_id: CorrelationId,
    resource: String,
    claims: Option<ClaimSet>,
    _state: PhantomData<S>,
}

// ============================================================================
// Shared methods (available on all states)
// ============================================================================

impl<S> RequestCtx<S> {
    /// Returns the correlation id minted for this request.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns the resource being authorized.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the subject once authenticated.
    pub fn subject(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }

    /// Returns the validated claim set once authenticated.
    pub fn claims(&self) -> Option<&ClaimSet> {
        self.claims.as_ref()
    }

    /// Returns a logger stamping this request's correlation id (and subject,
    /// once known) on every event.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(self.correlation_id, self.subject())
    }
}

// ============================================================================
// RequestCtx<Unauthed> - Initial state
// ============================================================================

impl RequestCtx<Unauthed> {
    /// Starts a request for `resource`, minting its correlation id.
    pub(crate) fn new(resource: impl Into<String>) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            resource: resource.into(),
            claims: None,
            _state: PhantomData,
        }
    }

    /// Authenticates the request with a validated claim set.
    ///
    /// The unauthenticated context stays usable so the caller can still
    /// deny the request with the same correlation id.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidCredential` denial if the claim set has an empty
    /// subject: there is no identity to authorize or to audit.
    pub fn authenticate(&self, claims: ClaimSet) -> Result<RequestCtx<Authed>, Denial> {
        if claims.sub.trim().is_empty() {
            return Err(Denial::new(
                DenialKind::InvalidCredential,
                "claim set has an empty subject",
            ));
        }

        Ok(RequestCtx {
            correlation_id: self.correlation_id,
            resource: self.resource.clone(),
            claims: Some(claims),
            _state: PhantomData,
        })
    }

    /// Finalizes the request as denied with the anonymous principal.
    pub fn deny(self) -> Decision {
        Decision::deny(self.resource, self.correlation_id)
    }
}

// ============================================================================
// RequestCtx<Authed> - Credential validated
// ============================================================================

impl RequestCtx<Authed> {
    /// Finalizes the request as allowed for the authenticated subject.
    pub fn allow(self) -> Decision {
        match self.claims {
            Some(claims) => Decision::allow(claims.sub, self.resource, self.correlation_id),
            // Unreachable through `authenticate`; fail closed regardless.
            None => Decision::deny(self.resource, self.correlation_id),
        }
    }
}
