use serde::Deserialize;

/// A token-authorizer event as delivered by the invoking gateway.
///
/// Field names follow the gateway's camelCase wire format:
///
/// ```json
/// { "type": "TOKEN", "authorizationToken": "Bearer <jwt>", "methodArn": "arn:..." }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// Event type reported by the gateway (usually `TOKEN`)
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    /// Raw value of the `Authorization` header, if any
    #[serde(default)]
    pub authorization_token: Option<String>,
    /// The protected resource being accessed, passed through verbatim
    #[serde(default)]
    pub method_arn: String,
}

impl AuthorizerRequest {
    /// Builds a request for `method_arn` carrying the given header value.
    pub fn new(authorization_token: Option<&str>, method_arn: impl Into<String>) -> Self {
        Self {
            event_type: Some("TOKEN".to_string()),
            authorization_token: authorization_token.map(str::to_string),
            method_arn: method_arn.into(),
        }
    }
}
