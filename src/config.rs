//! Engine configuration loading.
//!
//! Layers defaults, an optional `config/default.toml`, and
//! `ANALYTICS`-prefixed environment variables. Invalid configuration is
//! fatal at startup; it is never handled per-run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use collector::CollectorConfig;
use scheduler::SchedulerConfig;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    /// Startup sanity checks beyond what serde defaults guarantee.
    pub fn validate(&self) -> std::result::Result<(), metrics_core::Error> {
        if self.scheduler.concurrency == 0 {
            return Err(metrics_core::Error::config(
                "scheduler.concurrency must be at least 1",
            ));
        }
        if self.collector.top_products_limit == 0 {
            return Err(metrics_core::Error::config(
                "collector.top_products_limit must be at least 1",
            ));
        }
        if self.scheduler.realtime_window_secs == 0 {
            return Err(metrics_core::Error::config(
                "scheduler.realtime_window_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Load configuration from files and environment.
pub fn load_config() -> Result<EngineConfig> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&EngineConfig::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ANALYTICS")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let config: EngineConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
