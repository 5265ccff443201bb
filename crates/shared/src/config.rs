//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Deferred-posting worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,
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

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// TTL for the account lookup cache, in seconds.
    ///
    /// Posting-path validation always reads accounts inside the posting
    /// transaction and never consults this cache.
    #[serde(default = "default_account_cache_ttl")]
    pub account_cache_ttl_secs: u64,
    /// Retry attempts for contended ledger mutations.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

fn default_account_cache_ttl() -> u64 {
    5
}

fn default_retry_attempts() -> u32 {
    3
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            account_cache_ttl_secs: default_account_cache_ttl(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

/// Deferred-posting worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// How often the worker polls for due tasks, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Maximum tasks claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Attempts before a task is dead-lettered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    /// Deadline for a queued task, in seconds from enqueue.
    #[serde(default = "default_task_deadline")]
    pub task_deadline_secs: i64,
}

fn default_poll_interval() -> u64 {
    2
}

fn default_batch_size() -> u64 {
    20
}

fn default_max_attempts() -> i32 {
    5
}

fn default_task_deadline() -> i64 {
    3600
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            task_deadline_secs: default_task_deadline(),
        }
    }
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
            .add_source(config::Environment::with_prefix("NERACA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
