use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::audit::AuditRecorder;
use crate::context::RequestCtx;
use crate::decision::Decision;
use crate::error::{Denial, DenialKind, ValidationError};
use crate::extract::ExtractCredential;
use crate::request::AuthorizerRequest;
use crate::response::PolicyResponse;
use crate::state::{Authed, Unauthed};
use crate::validator::CredentialValidator;

/// The authorization decision engine.
///
/// `Authorizer` turns one gateway request into exactly one [`Decision`]. It
/// never fails: a missing credential, a rejected credential, a validator
/// timeout, or a panicking validator all end in Deny.
///
/// On Allow it hands the subject and correlation id to the
/// [`AuditRecorder`] and returns without waiting for the write.
///
/// The validator and the recorder are process-lifetime resources. Clone the
/// `Authorizer` to share them across tasks.
///
/// # Examples
///
/// ```
/// use gateway_authorizer::audit::{AuditRecorder, InMemoryAuditStore};
/// use gateway_authorizer::{AuthorizerRequest, Authorizer, Effect, JwtValidator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let validator = JwtValidator::hs256(b"secret", "https://issuer", "audience");
/// let recorder = AuditRecorder::new(InMemoryAuditStore::new("break-glass-index"));
/// let authorizer = Authorizer::new(validator, recorder);
///
/// let request = AuthorizerRequest::new(None, "arn:aws:execute-api:eu-west-1:1:api/prod/GET/x");
/// let decision = authorizer.decide(&request).await;
///
/// assert_eq!(decision.effect(), Effect::Deny);
/// assert_eq!(decision.principal_id(), "user");
/// # }
/// ```
#[derive(Clone)]
pub struct Authorizer {
    validator: Arc<dyn CredentialValidator>,
    recorder: AuditRecorder,
    validation_timeout: Duration,
}

impl Authorizer {
    /// Default deadline for a single credential validation.
    pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates an engine from a validator and an audit recorder.
    pub fn new(validator: impl CredentialValidator + 'static, recorder: AuditRecorder) -> Self {
        Self::from_shared(Arc::new(validator), recorder)
    }

    /// Creates an engine over an already shared validator.
    pub fn from_shared(validator: Arc<dyn CredentialValidator>, recorder: AuditRecorder) -> Self {
        Self {
            validator,
            recorder,
            validation_timeout: Self::DEFAULT_VALIDATION_TIMEOUT,
        }
    }

    /// Bounds every validator call by `timeout`. A call that runs past it
    /// is cancelled and the request is denied.
    pub fn with_validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// The recorder receiving audit writes for allowed requests.
    pub fn recorder(&self) -> &AuditRecorder {
        &self.recorder
    }

    /// Decides `request` and serializes the decision for the gateway.
    pub async fn handle(&self, request: &AuthorizerRequest) -> PolicyResponse {
        PolicyResponse::from(&self.decide(request).await)
    }

    /// Decides `request`.
    ///
    /// The correlation id is minted before anything else, so the start line,
    /// the outcome line, and the audit record of a request all share it.
    pub async fn decide(&self, request: &AuthorizerRequest) -> Decision {
        let ctx = RequestCtx::new(request.method_arn.clone());
        ctx.log().info(format_args!("Starting authorization for request."));

        match self.authenticate(&ctx, request).await {
            Ok(authed) => {
                authed.log().info(format_args!("Successfully authorized user"));

                let decision = authed.allow();
                self.recorder
                    .record(decision.principal_id().to_string(), decision.correlation_id());
                decision
            }
            Err(denial) => {
                let log = ctx.log();
                let (kind, reason) = (&denial.kind, &denial.reason);
                match denial.kind {
                    DenialKind::MissingCredential | DenialKind::InvalidCredential => {
                        log.warn(format_args!("Authorization failed ({kind}): {reason}"));
                    }
                    DenialKind::UnexpectedInternalFailure => {
                        log.error(format_args!("Authorization failed ({kind}): {reason}"));
                    }
                }
                ctx.deny()
            }
        }
    }

    async fn authenticate(
        &self,
        ctx: &RequestCtx<Unauthed>,
        request: &AuthorizerRequest,
    ) -> Result<RequestCtx<Authed>, Denial> {
        let credential = request
            .extract_credential()
            .ok_or_else(Denial::missing_credential)?;

        let validation = AssertUnwindSafe(self.validator.validate(&credential)).catch_unwind();

        let claims = match tokio::time::timeout(self.validation_timeout, validation).await {
            Err(_elapsed) => {
                return Err(Denial::invalid_credential(&ValidationError::Timeout(
                    self.validation_timeout,
                )));
            }
            Ok(Err(panic)) => {
                return Err(Denial::internal(format!(
                    "credential validator panicked: {}",
                    panic_message(panic.as_ref())
                )));
            }
            Ok(Ok(Err(err))) => return Err(Denial::invalid_credential(&err)),
            Ok(Ok(Ok(claims))) => claims,
        };

        ctx.authenticate(claims)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
