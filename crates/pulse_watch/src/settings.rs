use std::time::Duration;

use config::{Config, Environment};
use pulse_service::models::{
    sorts::SortConfig,
    token_query::{Pagination, DEFAULT_PAGE, DEFAULT_PAGE_SIZE},
    tokens::TokenStatus,
};
use serde::Deserialize;

use crate::{error::WatchError, live_patch::DEFAULT_FLASH_DURATION};

pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Read from `WATCH_*` environment variables.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WatchSettings {
    pub environment: Option<String>,
    pub url: Option<String>,
    pub tab: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub reconnect_delay_secs: Option<u64>,
    pub flash_ms: Option<u64>,
    /// Log file. The table owns the screen, so nothing is logged without one.
    pub log_file: Option<String>,
}

/// The list request the watcher keeps on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub tab: Option<TokenStatus>,
    pub pagination: Pagination,
    pub search: Option<String>,
    pub sort: SortConfig,
}

impl WatchSettings {
    pub fn is_production(&self) -> bool {
        self.environment.as_deref() == Some("PROD")
    }

    pub fn base_url(&self) -> String {
        self.url
            .as_deref()
            .unwrap_or(DEFAULT_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RECONNECT_DELAY)
    }

    pub fn flash_duration(&self) -> Duration {
        self.flash_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FLASH_DURATION)
    }

    /// Validates the list parameters up front so a typo fails before any
    /// request goes out.
    pub fn page_request(&self) -> Result<PageRequest, WatchError> {
        let tab = self
            .tab
            .as_deref()
            .map(|t| TokenStatus::try_from(t.trim().to_lowercase().as_str()))
            .transpose()
            .map_err(|e| WatchError::Config(e.to_string()))?;

        let pagination = Pagination::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .map_err(|e| WatchError::Config(e.to_string()))?;

        let sort = match self.sort.as_deref() {
            Some(param) => SortConfig::parse(param).map_err(|e| WatchError::Config(e.to_string()))?,
            None => SortConfig::default(),
        };

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(PageRequest {
            tab,
            pagination,
            search,
            sort,
        })
    }
}

pub fn load_settings() -> Result<WatchSettings, config::ConfigError> {
    let settings = Config::builder();
    let settings = settings.add_source(Environment::with_prefix("WATCH"));
    settings.build()?.try_deserialize()
}
