//! Service configuration management
//!
//! Loading order: defaults, then an optional TOML file, then `STANDINGS__*`
//! environment variables (`STANDINGS__CACHE__REDIS_URL`, ...), then the plain
//! deployment variables, then validation.

use crate::error::ServiceError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sheet_cache::CacheConfig;
use standings_engine::{CalendarConfig, EngineConfig, RewardPolicy};
use std::path::Path;

/// Prefix of structured environment overrides
pub const ENV_PREFIX: &str = "STANDINGS";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Cache backend configuration
    pub cache: CacheConfig,

    /// Business-day calendar
    pub calendar: CalendarConfig,

    /// Reward strategy selection
    pub rewards: RewardPolicy,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServiceConfig {
    /// Engine section of the configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig { calendar: self.calendar.clone(), rewards: self.rewards.clone() }
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        self.cache
            .validate()
            .map_err(|e| ServiceError::config(format!("Invalid cache configuration: {e}")))?;
        self.engine_config()
            .validate()
            .map_err(|e| ServiceError::config(format!("Invalid engine configuration: {e}")))?;

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ServiceError::config(format!("Unknown log level: {}", self.logging.level)));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ServiceError::config(format!("Unknown log format: {}", self.logging.format)));
        }

        Ok(())
    }
}

/// Load configuration from an optional file and the process environment
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = load_layers(path)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    config.validate()?;

    Ok(config)
}

/// Defaults, TOML file and structured environment layers
fn load_layers(path: Option<&Path>) -> Result<ServiceConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&ServiceConfig::default()).context("Failed to encode defaults")?);

    if let Some(path) = path {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml).required(true));
    }

    builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Apply plain deployment variables on top of the layered configuration
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("REDIS_URL") {
        config.cache.redis_url = url;
    }

    if let Some(ttl) = lookup("REDIS_TTL") {
        config.cache.ttl_seconds =
            Some(ttl.trim().parse().with_context(|| format!("REDIS_TTL is not a number: {ttl}"))?);
    }

    if let Some(offset) = lookup("APP_TZ_OFFSET") {
        config.calendar.utc_offset = offset;
    }

    if let Some(hour) = lookup("STANDINGS_CUTOFF_HOUR") {
        config.calendar.cutoff_hour =
            hour.trim().parse().with_context(|| format!("STANDINGS_CUTOFF_HOUR is not a number: {hour}"))?;
    }

    if let Some(stages) = lookup("POSITION_REWARD_STAGES") {
        config.rewards = RewardPolicy::new(stages.split(',').map(str::trim).filter(|s| !s.is_empty()));
    }

    if let Some(level) = lookup("STANDINGS_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("STANDINGS_LOG_FORMAT") {
        config.logging.format = format;
    }

    Ok(())
}
