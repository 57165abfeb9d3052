use serde::Deserialize;
use std::path::Path;
use tracing::Level;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const ERP_API_KEY_ENV: &str = "ERP_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErpConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_policy_ttl_secs")]
    pub policy_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy_ttl_secs: default_policy_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcurementConfig {
    /// Upper bound on concurrent ERP fetches during an AP payment run
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl Default for ProcurementConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_policy_ttl_secs() -> u64 {
    300
}

fn default_fetch_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FuneralCoreConfig {
    pub database_url: Option<String>,
    pub log_level: Option<LogLevel>,
    pub erp: ErpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub procurement: ProcurementConfig,
}

impl FuneralCoreConfig {
    /// Reads the TOML file and applies environment overrides.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&config_str)?;
        config.apply_overrides(
            std::env::var(DATABASE_URL_ENV).ok(),
            std::env::var(ERP_API_KEY_ENV).ok(),
        );
        Ok(config)
    }

    pub fn from_toml(config_toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(config_toml)?;
        if config.cache.policy_ttl_secs == 0 {
            return Err(ConfigError::NotPositive("cache.policy_ttl_secs"));
        }
        if config.procurement.fetch_concurrency == 0 {
            return Err(ConfigError::NotPositive("procurement.fetch_concurrency"));
        }
        if config.erp.timeout_secs == 0 {
            return Err(ConfigError::NotPositive("erp.timeout_secs"));
        }
        Ok(config)
    }

    /// Environment values win over the file; empty values are ignored.
    pub fn apply_overrides(&mut self, database_url: Option<String>, erp_api_key: Option<String>) {
        if let Some(url) = database_url.filter(|v| !v.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(key) = erp_api_key.filter(|v| !v.is_empty()) {
            self.erp.api_key = Some(key);
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or(LogLevel::Info)
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence over `log_level`.
pub fn setup_tracing(log_level: LogLevel) {
    let level: Level = log_level.into();
    let default_filter = format!(
        "funeral_core_service={level},funeral_core_postgres={level},funeral_core_erp={level}"
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
