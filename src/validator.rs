//! The credential validation boundary.
//!
//! The decision engine only sees [`CredentialValidator`]: an opaque,
//! possibly slow, possibly failing `validate(token) -> ClaimSet`. The
//! [`JwtValidator`] here verifies JWT signatures, expiry, issuer, and
//! audience against a process-lifetime [`KeySet`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::ValidationError;

/// The `aud` claim, which tokens may carry as a string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// A single audience
    One(String),
    /// Several audiences
    Many(Vec<String>),
}

impl Audience {
    /// Returns `true` if `aud` is among the token's audiences.
    pub fn contains(&self, aud: &str) -> bool {
        match self {
            Audience::One(a) => a == aud,
            Audience::Many(all) => all.iter().any(|a| a == aud),
        }
    }
}

/// The verified claims of a credential.
///
/// Produced once per request by the validator and owned by the decision
/// engine until the request completes. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Stable principal identifier
    pub sub: String,
    /// Token issuer
    pub iss: String,
    /// Intended audience(s)
    pub aud: Audience,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issued-at, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Validates a bearer credential and returns its claims.
///
/// Implementations may perform network I/O (fetching signing keys) and
/// must be shareable across concurrent requests.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Verifies `credential`, returning its claims or the reason it was rejected.
    async fn validate(&self, credential: &Credential) -> Result<ClaimSet, ValidationError>;
}

/// Verification keys indexed by JWT `kid`.
///
/// A key set is built once at startup and shared read-only by all requests.
#[derive(Clone, Default)]
pub struct KeySet {
    by_kid: HashMap<String, DecodingKey>,
    fallback: Option<DecodingKey>,
}

impl KeySet {
    /// Creates an empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key that verifies tokens whose header names `kid`.
    pub fn with_key(mut self, kid: impl Into<String>, key: DecodingKey) -> Self {
        self.by_kid.insert(kid.into(), key);
        self
    }

    /// Sets the key used for tokens without a `kid` header.
    pub fn with_fallback(mut self, key: DecodingKey) -> Self {
        self.fallback = Some(key);
        self
    }

    fn resolve(&self, kid: Option<&str>) -> Option<&DecodingKey> {
        match kid {
            Some(kid) => self.by_kid.get(kid),
            None => self.fallback.as_ref(),
        }
    }
}

/// A JWT validator checking signature, `exp`, `iss`, `aud`, and `sub`.
///
/// # Examples
///
/// ```
/// use gateway_authorizer::JwtValidator;
///
/// let validator = JwtValidator::hs256(
///     b"shared-secret",
///     "https://securetoken.google.com/my-project",
///     "my-project",
/// );
/// ```
#[derive(Clone)]
pub struct JwtValidator {
    keys: Arc<KeySet>,
    validation: Validation,
}

impl JwtValidator {
    /// Creates a validator for tokens signed with `algorithm`.
    pub fn new(keys: KeySet, algorithm: Algorithm, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            keys: Arc::new(keys),
            validation,
        }
    }

    /// Creates an HS256 validator with a single shared secret.
    pub fn hs256(secret: &[u8], issuer: &str, audience: &str) -> Self {
        let keys = KeySet::new().with_fallback(DecodingKey::from_secret(secret));
        Self::new(keys, Algorithm::HS256, issuer, audience)
    }

    /// Sets the clock-skew tolerance applied to `exp`, in seconds.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.validation.leeway = seconds;
        self
    }

    fn verify(&self, token: &str) -> Result<ClaimSet, ValidationError> {
        let header = decode_header(token).map_err(|e| map_jwt_error(&e))?;

        let key = self
            .keys
            .resolve(header.kid.as_deref())
            .ok_or_else(|| ValidationError::UnknownKey(header.kid.clone()))?;

        let data = decode::<ClaimSet>(token, key, &self.validation).map_err(|e| map_jwt_error(&e))?;

        if data.claims.sub.trim().is_empty() {
            return Err(ValidationError::Other("empty subject claim".to_string()));
        }

        Ok(data.claims)
    }
}

#[async_trait]
impl CredentialValidator for JwtValidator {
    async fn validate(&self, credential: &Credential) -> Result<ClaimSet, ValidationError> {
        tracing::debug!(token = %credential.preview(), "validating bearer token");
        self.verify(credential.expose_secret())
    }
}

fn map_jwt_error(err: &jsonwebtoken::errors::Error) -> ValidationError {
    match err.kind() {
        ErrorKind::ExpiredSignature => ValidationError::Expired,
        ErrorKind::InvalidSignature => ValidationError::InvalidSignature,
        ErrorKind::InvalidIssuer => ValidationError::IssuerMismatch,
        ErrorKind::InvalidAudience => ValidationError::AudienceMismatch,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => ValidationError::Malformed(err.to_string()),
        _ => ValidationError::Other(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";
    const ISSUER: &str = "https://securetoken.google.com/sync-well";
    const AUDIENCE: &str = "sync-well";

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn claims(sub: &str, iss: &str, aud: &str, exp: i64) -> ClaimSet {
        ClaimSet {
            sub: sub.to_string(),
            iss: iss.to_string(),
            aud: Audience::One(aud.to_string()),
            exp,
            iat: Some(now()),
        }
    }

    fn sign(claims: &ClaimSet, secret: &[u8]) -> Credential {
        let token = encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).unwrap();
        Credential::new(token)
    }

    fn validator() -> JwtValidator {
        JwtValidator::hs256(SECRET, ISSUER, AUDIENCE)
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let token = sign(&claims("user-123", ISSUER, AUDIENCE, now() + 3600), SECRET);
        let claims = validator().validate(&token).await.unwrap();
        assert_eq!(claims.sub, "user-123");
        assert!(claims.aud.contains(AUDIENCE));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let token = sign(&claims("user-123", ISSUER, AUDIENCE, now() - 3600), SECRET);
        assert_eq!(
            validator().validate(&token).await.unwrap_err(),
            ValidationError::Expired
        );
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let token = sign(&claims("user-123", ISSUER, AUDIENCE, now() + 3600), b"other");
        assert_eq!(
            validator().validate(&token).await.unwrap_err(),
            ValidationError::InvalidSignature
        );
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() {
        let token = sign(
            &claims("user-123", "https://evil.example", AUDIENCE, now() + 3600),
            SECRET,
        );
        assert_eq!(
            validator().validate(&token).await.unwrap_err(),
            ValidationError::IssuerMismatch
        );
    }

    #[tokio::test]
    async fn rejects_wrong_audience() {
        let token = sign(&claims("user-123", ISSUER, "other-app", now() + 3600), SECRET);
        assert_eq!(
            validator().validate(&token).await.unwrap_err(),
            ValidationError::AudienceMismatch
        );
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let token = Credential::new("not-a-jwt".to_string());
        assert!(matches!(
            validator().validate(&token).await.unwrap_err(),
            ValidationError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn rejects_empty_subject() {
        let token = sign(&claims("  ", ISSUER, AUDIENCE, now() + 3600), SECRET);
        assert!(matches!(
            validator().validate(&token).await.unwrap_err(),
            ValidationError::Other(_)
        ));
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let keys = KeySet::new().with_key("key-1", DecodingKey::from_secret(SECRET));
        let validator = JwtValidator::new(keys, Algorithm::HS256, ISSUER, AUDIENCE);

        let mut header = Header::default();
        header.kid = Some("key-2".to_string());
        let token = encode(
            &header,
            &claims("user-123", ISSUER, AUDIENCE, now() + 3600),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            validator.validate(&Credential::new(token)).await.unwrap_err(),
            ValidationError::UnknownKey(Some("key-2".to_string()))
        );
    }

    #[tokio::test]
    async fn known_kid_selects_key() {
        let keys = KeySet::new().with_key("key-1", DecodingKey::from_secret(SECRET));
        let validator = JwtValidator::new(keys, Algorithm::HS256, ISSUER, AUDIENCE);

        let mut header = Header::default();
        header.kid = Some("key-1".to_string());
        let token = encode(
            &header,
            &claims("user-9", ISSUER, AUDIENCE, now() + 3600),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let claims = validator.validate(&Credential::new(token)).await.unwrap();
        assert_eq!(claims.sub, "user-9");
    }

    #[test]
    fn audience_accepts_list_form() {
        let aud: Audience = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert!(aud.contains("b"));
        assert!(!aud.contains("c"));
    }
}
