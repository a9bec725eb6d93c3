use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::jobs::price_feed::{PriceFeedConfig, DEFAULT_INTERVAL, DEFAULT_VOLATILITY};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEED_PER_TAB: usize = 50;
pub const DEFAULT_BROADCAST_CAPACITY: usize = 100;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub environment: Option<String>,
    pub port: Option<u16>,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub feed_interval_ms: Option<u64>,
    pub feed_volatility: Option<f64>,
    pub feed_skip_without_subscribers: Option<bool>,
    pub seed_per_tab: Option<usize>,
    pub broadcast_capacity: Option<usize>,
}

impl Settings {
    pub fn is_production(&self) -> bool {
        self.environment.as_deref() == Some("PROD")
    }

    pub fn feed_config(&self) -> PriceFeedConfig {
        PriceFeedConfig {
            interval: self
                .feed_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_INTERVAL),
            volatility: self.feed_volatility.unwrap_or(DEFAULT_VOLATILITY),
            skip_without_subscribers: self.feed_skip_without_subscribers.unwrap_or(false),
        }
    }

    pub fn seed_per_tab(&self) -> usize {
        self.seed_per_tab.unwrap_or(DEFAULT_SEED_PER_TAB)
    }

    pub fn broadcast_capacity(&self) -> usize {
        self.broadcast_capacity
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_BROADCAST_CAPACITY)
    }
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let settings = Config::builder();
    let settings = settings.add_source(Environment::default());
    settings.build()?.try_deserialize()
}
