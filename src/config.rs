//! Environment-provided configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::level_filters::LevelFilter;

use crate::error::ConfigError;

/// Severity threshold for emitted logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Everything, including token previews during validation
    Debug,
    /// Request start and outcome
    #[default]
    Info,
    /// Denials and missed audit entries
    Warn,
    /// Audit write failures and internal failures only
    Error,
}

impl LogLevel {
    /// The `tracing` filter matching this threshold.
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Where allowed requests are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditBackend {
    /// A DynamoDB table named by `table_name`
    #[default]
    DynamoDb,
    /// An in-process store, lost at exit
    Memory,
}

impl FromStr for AuditBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(AuditBackend::DynamoDb),
            "memory" => Ok(AuditBackend::Memory),
            _ => Err(ConfigError::InvalidAuditStore(s.to_string())),
        }
    }
}

impl fmt::Display for AuditBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditBackend::DynamoDb => write!(f, "dynamodb"),
            AuditBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Authorizer configuration, read once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Region of the audit store, if the store needs one
    pub region: Option<String>,
    /// Audit (break-glass) table name
    pub table_name: String,
    /// Audit store implementation
    pub audit_store: AuditBackend,
    /// Log severity threshold
    pub log_level: LogLevel,
    /// Required token issuer
    pub issuer: String,
    /// Required token audience
    pub audience: String,
    /// Deadline for a single credential validation
    pub validation_timeout: Duration,
    /// How long shutdown waits for in-flight audit writes
    pub shutdown_grace: Duration,
}

impl AuthorizerConfig {
    /// Optional. Region of the audit store.
    pub const REGION: &'static str = "AWS_REGION";
    /// Required. Audit table name.
    pub const TABLE_NAME: &'static str = "BREAK_GLASS_TABLE_NAME";
    /// `dynamodb` or `memory`; defaults to `dynamodb`.
    pub const AUDIT_STORE: &'static str = "AUDIT_STORE";
    /// `DEBUG`, `INFO`, `WARN` or `ERROR`; defaults to `INFO`.
    pub const LOG_LEVEL: &'static str = "LOG_LEVEL";
    /// Required. Expected token issuer.
    pub const ISSUER: &'static str = "JWT_ISSUER";
    /// Required. Expected token audience.
    pub const AUDIENCE: &'static str = "JWT_AUDIENCE";
    /// Validation deadline in milliseconds; defaults to 5000.
    pub const VALIDATION_TIMEOUT_MS: &'static str = "AUTHORIZER_VALIDATION_TIMEOUT_MS";
    /// Shutdown drain window in milliseconds; defaults to 2000.
    pub const SHUTDOWN_GRACE_MS: &'static str = "AUTHORIZER_SHUTDOWN_GRACE_MS";

    const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_millis(5_000);
    const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(2_000);

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let log_level = match get(Self::LOG_LEVEL) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };

        let audit_store = match get(Self::AUDIT_STORE) {
            Some(raw) => raw.parse()?,
            None => AuditBackend::default(),
        };

        Ok(Self {
            region: get(Self::REGION),
            table_name: require(Self::TABLE_NAME)?,
            audit_store,
            log_level,
            issuer: require(Self::ISSUER)?,
            audience: require(Self::AUDIENCE)?,
            validation_timeout: millis(
                Self::VALIDATION_TIMEOUT_MS,
                get(Self::VALIDATION_TIMEOUT_MS),
                Self::DEFAULT_VALIDATION_TIMEOUT,
            )?,
            shutdown_grace: millis(
                Self::SHUTDOWN_GRACE_MS,
                get(Self::SHUTDOWN_GRACE_MS),
                Self::DEFAULT_SHUTDOWN_GRACE,
            )?,
        })
    }
}

fn millis(
    name: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
