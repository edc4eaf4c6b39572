//! Local harness: one gateway event per stdin line, one policy per stdout line.
//!
//! ```text
//! $ export BREAK_GLASS_TABLE_NAME=break-glass-index JWT_ISSUER=https://issuer \
//!          JWT_AUDIENCE=audience JWT_HS256_SECRET=secret AUDIT_STORE=memory
//! $ echo '{"type":"TOKEN","authorizationToken":"Bearer ...","methodArn":"arn:..."}' \
//!     | gateway-authorizer
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use gateway_authorizer::audit::{AuditRecorder, AuditStore, DynamoAuditStore, InMemoryAuditStore};
use gateway_authorizer::logging;
use gateway_authorizer::{
    AuditBackend, Authorizer, AuthorizerConfig, AuthorizerRequest, JwtValidator, LogLevel,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const JWT_SECRET: &str = "JWT_HS256_SECRET";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AuthorizerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            logging::init(LogLevel::default());
            tracing::error!(error = %err, "invalid authorizer configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_level);

    let secret = match std::env::var(JWT_SECRET) {
        Ok(secret) if !secret.trim().is_empty() => secret,
        _ => {
            tracing::error!(variable = JWT_SECRET, "missing token verification secret");
            return ExitCode::FAILURE;
        }
    };

    let validator = JwtValidator::hs256(secret.as_bytes(), &config.issuer, &config.audience);
    let store: Arc<dyn AuditStore> = match config.audit_store {
        AuditBackend::DynamoDb => Arc::new(
            DynamoAuditStore::connect(config.region.clone(), config.table_name.clone()).await,
        ),
        AuditBackend::Memory => Arc::new(InMemoryAuditStore::new(config.table_name.clone())),
    };
    let authorizer = Authorizer::new(validator, AuditRecorder::from_shared(store))
        .with_validation_timeout(config.validation_timeout);

    tracing::info!(
        table = %config.table_name,
        audit_store = %config.audit_store,
        region = config.region.as_deref().unwrap_or("default chain"),
        log_level = %config.log_level,
        "authorizer ready"
    );

    let served = serve(&authorizer).await;
    authorizer.recorder().shutdown(config.shutdown_grace).await;

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "authorizer harness I/O failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(authorizer: &Authorizer) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<AuthorizerRequest>(&line) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "unparseable authorizer event; treating as unauthenticated");
                AuthorizerRequest::default()
            }
        };

        let response = authorizer.handle(&request).await;

        let mut out = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}
