//! DynamoDB-backed break-glass index.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use super::record::Attribute;
use super::{AuditRecord, AuditStore};
use crate::error::AuditWriteError;

/// Writes audit records to a DynamoDB table keyed by `userId`.
///
/// The table's TTL attribute must be set to `ttl` for records to expire.
/// The client is built once per process and shared by every write.
#[derive(Debug, Clone)]
pub struct DynamoAuditStore {
    client: Client,
    table_name: String,
}

impl DynamoAuditStore {
    /// Wraps an already configured client.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds a client from the default AWS credential and region chain.
    ///
    /// `region` overrides the region the chain would otherwise resolve.
    pub async fn connect(region: Option<String>, table_name: impl Into<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        Self::new(Client::new(&config), table_name)
    }

    /// The table receiving writes.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl AuditStore for DynamoAuditStore {
    async fn put(&self, record: AuditRecord) -> Result<(), AuditWriteError> {
        let mut request = self.client.put_item().table_name(&self.table_name);
        for (name, value) in record.attributes() {
            request = request.item(name, attribute_value(value));
        }

        request.send().await.map_err(map_put_error)?;
        Ok(())
    }
}

fn attribute_value(attribute: Attribute) -> AttributeValue {
    match attribute {
        Attribute::S(s) => AttributeValue::S(s),
        Attribute::N(n) => AttributeValue::N(n),
    }
}

fn map_put_error(err: SdkError<PutItemError>) -> AuditWriteError {
    match err.as_service_error() {
        Some(service)
            if service.is_provisioned_throughput_exceeded_exception()
                || service.is_request_limit_exceeded() =>
        {
            AuditWriteError::Throttled
        }
        Some(service) => AuditWriteError::Rejected(service.to_string()),
        None => AuditWriteError::Unavailable(DisplayErrorContext(&err).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::CorrelationId;
    use aws_sdk_dynamodb::config::retry::RetryConfig;
    use aws_sdk_dynamodb::config::Credentials;
    use chrono::Utc;

    fn unreachable_store() -> DynamoAuditStore {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .endpoint_url("http://127.0.0.1:1")
            .credentials_provider(Credentials::new("akid", "secret", None, None, "static"))
            .retry_config(RetryConfig::disabled())
            .build();

        DynamoAuditStore::new(Client::from_conf(config), "break-glass-index")
    }

    #[test]
    fn attributes_map_to_dynamo_types() {
        assert_eq!(
            attribute_value(Attribute::S("USER#user-123".to_string())),
            AttributeValue::S("USER#user-123".to_string())
        );
        assert_eq!(
            attribute_value(Attribute::N("1714651200".to_string())),
            AttributeValue::N("1714651200".to_string())
        );
    }

    #[tokio::test]
    async fn unreachable_table_is_reported_as_unavailable() {
        let store = unreachable_store();
        let record = AuditRecord::new("user-123", CorrelationId::new(), Utc::now());

        let err = store.put(record).await.unwrap_err();

        assert!(matches!(err, AuditWriteError::Unavailable(_)), "{err:?}");
        assert_eq!(store.table_name(), "break-glass-index");
    }
}
