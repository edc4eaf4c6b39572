//! Request-time authorization for an API gateway.
//!
//! For every inbound request the gateway hands over a bearer credential and
//! the resource being invoked. This crate returns an Allow or Deny policy and
//! records, for every Allow, who was let in under which correlation id.
//!
//! - **Extraction**: [`extract_bearer`] pulls the token out of the header
//! - **Validation**: a [`CredentialValidator`] turns a token into a [`ClaimSet`]
//! - **Decision**: the [`Authorizer`] produces exactly one [`Decision`] per request
//! - **Audit**: [`audit::AuditRecorder`] writes `USER#subject -> correlationId`
//!   off the request path
//! - **Wire**: [`PolicyResponse`] is the shape the gateway consumes
//!
//! # Fail Closed
//!
//! Every failure before a decision is made, including a panicking or hung
//! validator, produces a Deny. Audit write failures never change a decision.
//!
//! # Examples
//!
//! ```
//! use gateway_authorizer::audit::{AuditRecorder, InMemoryAuditStore};
//! use gateway_authorizer::{Authorizer, AuthorizerRequest, JwtValidator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let authorizer = Authorizer::new(
//!     JwtValidator::hs256(b"secret", "https://issuer", "audience"),
//!     AuditRecorder::new(InMemoryAuditStore::new("break-glass-index")),
//! );
//!
//! let request = AuthorizerRequest::new(Some("Basic abc"), "arn:aws:execute-api:eu-west-1:1:api/prod/GET/x");
//! let response = authorizer.handle(&request).await;
//!
//! assert_eq!(response.principal_id, "user");
//! assert_eq!(response.policy_document.statement[0].effect, "Deny");
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod config;
mod context;
mod credential;
mod decision;
mod engine;
mod error;
mod extract;
pub mod logging;
mod request;
mod response;
mod state;
mod validator;

pub use config::{AuditBackend, AuthorizerConfig, LogLevel};
pub use context::RequestCtx;
pub use credential::Credential;
pub use decision::{ANONYMOUS_PRINCIPAL, CorrelationId, Decision, Effect};
pub use engine::Authorizer;
pub use error::{AuditWriteError, ConfigError, Denial, DenialKind, ValidationError};
pub use extract::{BEARER_SCHEME, ExtractCredential, extract_bearer};
pub use request::AuthorizerRequest;
pub use response::{
    INVOKE_ACTION, POLICY_VERSION, PolicyDocument, PolicyResponse, ResponseContext, Statement,
};
pub use state::{Authed, Unauthed};
pub use validator::{Audience, ClaimSet, CredentialValidator, JwtValidator, KeySet};
