//! The wire contract returned to the invoking gateway.

use serde::Serialize;

use crate::decision::Decision;

/// IAM policy language version used in every policy document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The single action every statement grants or denies.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// An authorizer response as consumed by the gateway.
///
/// ```json
/// {
///   "principalId": "user-123",
///   "policyDocument": {
///     "Version": "2012-10-17",
///     "Statement": [
///       { "Action": "execute-api:Invoke", "Effect": "Allow", "Resource": "arn:..." }
///     ]
///   },
///   "context": { "correlationId": "..." }
/// }
/// ```
///
/// On Deny, `context` is the empty object: the correlation id is logged
/// but not passed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    /// The subject on Allow, the anonymous placeholder on Deny
    pub principal_id: String,
    /// The single-statement policy
    pub policy_document: PolicyDocument,
    /// Values forwarded downstream
    pub context: ResponseContext,
}

/// An IAM policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Always [`POLICY_VERSION`]
    pub version: String,
    /// Exactly one statement
    pub statement: Vec<Statement>,
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Always [`INVOKE_ACTION`]
    pub action: String,
    /// `Allow` or `Deny`
    pub effect: String,
    /// The requested resource, verbatim
    pub resource: String,
}

/// Values forwarded to the backend alongside the decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContext {
    /// Present on Allow only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl PolicyResponse {
    /// Serializes a decision into the gateway's policy shape.
    pub fn from_decision(decision: &Decision) -> Self {
        Self {
            principal_id: decision.principal_id().to_string(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect: decision.effect().as_str().to_string(),
                    resource: decision.resource().to_string(),
                }],
            },
            context: ResponseContext {
                correlation_id: decision.context_correlation_id().map(|id| id.to_string()),
            },
        }
    }
}

impl From<&Decision> for PolicyResponse {
    fn from(decision: &Decision) -> Self {
        Self::from_decision(decision)
    }
}
