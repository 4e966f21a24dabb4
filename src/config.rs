use anyhow::{Context, Result};
use compute::forecast::Horizon;
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Prefix of the environment variables read into [`Settings`], e.g. `WLACAST_BIND_ADDRESS`.
pub const ENV_PREFIX: &str = "WLACAST";

/// Optional configuration file, looked up without extension (`wlacast.toml`, `wlacast.yaml`, ...).
pub const CONFIG_FILE: &str = "wlacast";

/// Application settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Database URL
    pub database_url: String,
    /// Bind address for the web server
    pub bind_address: String,
    /// Maximum number of cached record selections and dashboard passes
    pub cache_capacity: u64,
    /// Lifetime of cached entries in seconds
    pub cache_ttl_secs: u64,
    /// Horizon used when a request does not name one
    pub default_horizon: u32,
}

impl Settings {
    /// Layers defaults, the optional config file and `WLACAST_*` variables.
    ///
    /// `.env` is loaded first, so its variables take part in the environment layer.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some(CONFIG_FILE))
    }

    fn from_sources(config_file: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("database_url", "sqlite://wlacast.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("cache_capacity", 100)?
            .set_default("cache_ttl_secs", 300)?
            .set_default("default_horizon", Horizon::DEFAULT)?;

        if let Some(file) = config_file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Horizon::new(settings.default_horizon).context("Invalid default_horizon")?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Initialize application state for the given database
pub async fn initialize_app_state_with_url(database_url: &str, settings: &Settings) -> Result<AppState> {
    // Connect to database
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    // Initialize cache
    let cache = Cache::builder()
        .max_capacity(settings.cache_capacity)
        .time_to_live(settings.cache_ttl())
        .build();

    let records = compute::default_source(settings.cache_capacity as usize, settings.cache_ttl());

    Ok(AppState {
        db,
        cache,
        records: Arc::new(records),
        forecaster: Arc::new(compute::default_forecaster()),
        default_horizon: settings.default_horizon,
    })
}
