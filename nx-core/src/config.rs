use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration, layered env > file > defaults.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub sync: SyncConfig,
    pub dispatcher: DispatcherConfig,
    pub accounts: Vec<SourceAccountConfig>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("logging", &self.logging)
            .field("sync", &self.sync)
            .field("dispatcher", &self.dispatcher)
            .field("accounts", &self.accounts)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked_url = if let Some(at_pos) = self.url.find('@') {
            if let Some(colon_pos) = self.url[..at_pos].rfind(':') {
                let scheme_end = self.url.find("://").map(|p| p + 3).unwrap_or(0);
                if colon_pos > scheme_end {
                    format!("{}:****@{}", &self.url[..colon_pos], &self.url[at_pos + 1..])
                } else {
                    self.url.clone()
                }
            } else {
                self.url.clone()
            }
        } else {
            self.url.clone()
        };

        f.debug_struct("DatabaseConfig")
            .field("url", &masked_url)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://nx:nx@localhost:5432/nx".to_string(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Tunables for the catalog sync service and the channel buffer it feeds.
///
/// `low_ram()` mirrors the reduced-footprint profile a constrained device
/// would select: smaller buffer, fewer concurrent consumers, smaller commit
/// batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub channel_capacity: usize,
    pub consumer_concurrency: usize,
    pub batch_size: usize,
    pub min_sync_interval_secs: i64,
    pub enable_episodes_phase: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1000,
            consumer_concurrency: 3,
            batch_size: 200,
            min_sync_interval_secs: 60,
            enable_episodes_phase: true,
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn low_ram() -> Self {
        Self {
            channel_capacity: 500,
            consumer_concurrency: 2,
            batch_size: 50,
            min_sync_interval_secs: 60,
            enable_episodes_phase: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Debounce interval for change streams while idle (ms).
    pub observe_debounce_idle_ms: u64,
    /// Debounce interval for change streams while a sync is in progress (ms).
    pub observe_debounce_syncing_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            observe_debounce_idle_ms: 100,
            observe_debounce_syncing_ms: 2000,
        }
    }
}

/// Declarative account bootstrap entry. On startup, any account listed here
/// that does not already exist as a `SourceAccount` row is created — mirroring
/// the teacher's idempotent root-user bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAccountConfig {
    pub account_key: String,
    pub provider_type: String,
    pub endpoint: String,
    /// Opaque handle into whatever secret store holds real credentials; the
    /// value itself is never logged.
    pub credentials_handle: String,
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, config::FileFormat::Yaml));
            }
        }

        // Override with environment variables (NX_DATABASE_URL, NX_SYNC_BATCH_SIZE, etc.)
        builder = builder.add_source(
            Environment::with_prefix("NX")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Validate configuration at startup (fail fast on misconfigurations).
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.min_connections > self.database.max_connections {
            errors.push(format!(
                "database.min_connections ({}) must not exceed database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            ));
        }
        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be greater than 0".to_string());
        }
        if self.database.url.is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if self.sync.channel_capacity == 0 {
            errors.push("sync.channel_capacity must be greater than 0".to_string());
        }
        if self.sync.consumer_concurrency == 0 {
            errors.push("sync.consumer_concurrency must be greater than 0".to_string());
        }
        if self.sync.batch_size == 0 {
            errors.push("sync.batch_size must be greater than 0".to_string());
        }
        if self.sync.min_sync_interval_secs < 0 {
            errors.push("sync.min_sync_interval_secs must not be negative".to_string());
        }

        for account in &self.accounts {
            if account.account_key.is_empty() {
                errors.push("accounts[].account_key must not be empty".to_string());
            }
            if account.provider_type.is_empty() {
                errors.push(format!(
                    "accounts[{}].provider_type must not be empty",
                    account.account_key
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn low_ram_profile_shrinks_resources() {
        let default = SyncConfig::default();
        let low_ram = SyncConfig::low_ram();
        assert!(low_ram.channel_capacity < default.channel_capacity);
        assert!(low_ram.consumer_concurrency < default.consumer_concurrency);
        assert!(low_ram.batch_size < default.batch_size);
    }

    #[test]
    fn rejects_pool_size_inversion() {
        let mut config = Config::default();
        config.database.min_connections = 10;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unnamed_account() {
        let mut config = Config::default();
        config.accounts.push(SourceAccountConfig {
            account_key: String::new(),
            provider_type: "xtream".to_string(),
            endpoint: "https://example.invalid".to_string(),
            credentials_handle: "secret://acc1".to_string(),
        });
        assert!(config.validate().is_err());
    }
}
