//! Engine configuration.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use grail_sync::SyncConfig;
//!
//! let config = SyncConfig::new()
//!     .with_api_base_url("https://grailseeker.example")
//!     .with_campaign_id("5339123882")
//!     .with_poll_interval(Duration::from_millis(10));
//!
//! assert_eq!(config.api_base_url(), "https://grailseeker.example");
//! assert_eq!(config.campaign_id(), Some("5339123882"));
//! ```

use std::env;
use std::time::Duration;

use crate::api::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable naming the API origin.
pub const API_URL_VAR: &str = "GRAIL_API_URL";
/// Environment variable naming the eBay Partner Network campaign id.
pub const CAMPAIGN_ID_VAR: &str = "GRAIL_EPN_CAMPAIGN_ID";

/// Settings shared by the stores and the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    api_base_url: String,
    campaign_id: Option<String>,
    poll_interval: Duration,
    page_size: u32,
    request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        SyncConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            campaign_id: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read `GRAIL_API_URL` and `GRAIL_EPN_CAMPAIGN_ID` from the
    /// environment, falling back to defaults for anything unset or empty.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(url) = env::var(API_URL_VAR) {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }
        if let Ok(campaign_id) = env::var(CAMPAIGN_ID_VAR) {
            if !campaign_id.is_empty() {
                config.campaign_id = Some(campaign_id);
            }
        }
        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_campaign_id(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }

    /// How long the worker waits for control messages and feed events
    /// before checking for work again.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Default window size for alert pages.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn campaign_id(&self) -> Option<&str> {
        self.campaign_id.as_deref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
