//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Artifact storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Finance alerting and reporting configuration.
    #[serde(default)]
    pub finance: FinanceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Where rendered quotation documents are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum StorageSettings {
    /// S3-compatible storage: Cloudflare R2, AWS S3, MinIO.
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
        /// Base URL documents are served from.
        public_base_url: String,
    },
    /// Local filesystem (development only).
    Fs {
        /// Root directory.
        root: String,
        /// Base URL documents are served from.
        #[serde(default = "default_public_base_url")]
        public_base_url: String,
    },
    /// In-process memory (tests).
    Memory {
        /// Base URL documents are served from.
        #[serde(default = "default_public_base_url")]
        public_base_url: String,
    },
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self::Fs {
            root: "./artifacts".to_string(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl StorageSettings {
    /// Returns the base URL documents are served from.
    #[must_use]
    pub fn public_base_url(&self) -> &str {
        match self {
            Self::S3 {
                public_base_url, ..
            }
            | Self::Fs {
                public_base_url, ..
            }
            | Self::Memory { public_base_url } => public_base_url,
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080/artifacts".to_string()
}

/// Finance alerting and reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceConfig {
    /// Roles that receive budget threshold alerts.
    #[serde(default = "default_finance_roles")]
    pub finance_roles: Vec<String>,
    /// Pending payments at or above this amount count as high-value alerts.
    #[serde(default = "default_high_value_payment_threshold")]
    pub high_value_payment_threshold: Decimal,
    /// Upper bound on a single artifact generation call.
    #[serde(default = "default_artifact_timeout_secs")]
    pub artifact_timeout_secs: u64,
    /// Time-to-live of cached monthly reports.
    #[serde(default = "default_report_cache_ttl_secs")]
    pub report_cache_ttl_secs: u64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            finance_roles: default_finance_roles(),
            high_value_payment_threshold: default_high_value_payment_threshold(),
            artifact_timeout_secs: default_artifact_timeout_secs(),
            report_cache_ttl_secs: default_report_cache_ttl_secs(),
        }
    }
}

fn default_finance_roles() -> Vec<String> {
    vec!["finance".to_string()]
}

fn default_high_value_payment_threshold() -> Decimal {
    Decimal::from(10_000_000)
}

fn default_artifact_timeout_secs() -> u64 {
    10
}

fn default_report_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("ESTIMO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("finance.finance_roles")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
