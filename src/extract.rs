//! Credential extraction from inbound authorization headers.
//!
//! This module is the boundary between the gateway's raw header value and the
//! [`Credential`] type. It is pure: no I/O, no logging, no validation.

use crate::credential::Credential;
use crate::request::AuthorizerRequest;

/// The only authorization scheme the authorizer accepts. Matched case-sensitively.
pub const BEARER_SCHEME: &str = "Bearer";

/// Pulls a bearer token out of an `Authorization` header value.
///
/// Only the exact two-segment form `"Bearer <token>"` is accepted. Every other
/// shape is treated as an absent credential:
/// - missing header
/// - a different scheme (`Basic ...`, `bearer ...`)
/// - the scheme with no token (`"Bearer"`, `"Bearer "`)
/// - extra separators or segments (`"Bearer  tok"`, `"Bearer a b"`)
/// - a token containing any other whitespace (`"Bearer a\tb"`, `"Bearer tok\n"`)
///
/// # Examples
///
/// ```
/// use gateway_authorizer::extract_bearer;
///
/// let token = extract_bearer(Some("Bearer good-token")).unwrap();
/// assert_eq!(token.expose_secret(), "good-token");
///
/// assert!(extract_bearer(Some("Basic xyz")).is_none());
/// assert!(extract_bearer(None).is_none());
/// ```
pub fn extract_bearer(header: Option<&str>) -> Option<Credential> {
    let mut parts = header?.split(' ');

    let scheme = parts.next()?;
    let token = parts.next()?;

    if scheme != BEARER_SCHEME
        || token.is_empty()
        || token.chars().any(char::is_whitespace)
        || parts.next().is_some()
    {
        return None;
    }

    Some(Credential::new(token.to_string()))
}

/// Extracts a bearer credential from a host-specific request type.
///
/// Hosts with their own request shape implement this to apply the same
/// extraction rules the engine applies to [`AuthorizerRequest`], for example
/// to reject a request early before building the gateway event.
/// Implementations must not grant anything: they only locate the header and
/// defer to [`extract_bearer`].
///
/// # Examples
///
/// ```
/// use gateway_authorizer::{extract_bearer, Credential, ExtractCredential};
///
/// struct HttpRequest {
///     authorization: Option<String>,
/// }
///
/// impl ExtractCredential for HttpRequest {
///     fn extract_credential(&self) -> Option<Credential> {
///         extract_bearer(self.authorization.as_deref())
///     }
/// }
///
/// let req = HttpRequest { authorization: Some("Bearer t0k".to_string()) };
/// assert!(req.extract_credential().is_some());
/// ```
pub trait ExtractCredential {
    /// Returns the bearer credential, or `None` when absent or malformed.
    fn extract_credential(&self) -> Option<Credential>;
}

impl ExtractCredential for AuthorizerRequest {
    fn extract_credential(&self) -> Option<Credential> {
        extract_bearer(self.authorization_token.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(header: &str) -> Option<String> {
        extract_bearer(Some(header)).map(|c| c.expose_secret().to_string())
    }

    #[test]
    fn well_formed_header_yields_token() {
        assert_eq!(token_of("Bearer good-token").as_deref(), Some("good-token"));
    }

    #[test]
    fn missing_header_is_absent() {
        assert!(extract_bearer(None).is_none());
    }

    #[test]
    fn wrong_scheme_is_absent() {
        assert!(token_of("Basic xyz").is_none());
        assert!(token_of("Token abc").is_none());
    }

    #[test]
    fn scheme_match_is_case_sensitive() {
        assert!(token_of("bearer abc").is_none());
        assert!(token_of("BEARER abc").is_none());
    }

    #[test]
    fn scheme_without_token_is_absent() {
        assert!(token_of("Bearer").is_none());
        assert!(token_of("Bearer ").is_none());
        assert!(token_of("").is_none());
    }

    #[test]
    fn token_with_other_whitespace_is_absent() {
        assert!(token_of("Bearer a\tb").is_none());
        assert!(token_of("Bearer tok\n").is_none());
        assert!(token_of("Bearer tok\r").is_none());
        assert!(token_of("Bearer\ttok").is_none());
        assert!(token_of("Bearer a\u{a0}b").is_none());
    }

    #[test]
    fn extra_spaces_or_segments_are_absent() {
        assert!(token_of("Bearer  double-space").is_none());
        assert!(token_of(" Bearer leading").is_none());
        assert!(token_of("Bearer a b").is_none());
        assert!(token_of("Bearer trailing ").is_none());
    }

    #[test]
    fn request_extracts_from_authorization_token() {
        let req = AuthorizerRequest::new(Some("Bearer from-request"), "arn:r");
        let credential = req.extract_credential().expect("credential present");
        assert_eq!(credential.expose_secret(), "from-request");

        let req = AuthorizerRequest::new(None, "arn:r");
        assert!(req.extract_credential().is_none());
    }
}
