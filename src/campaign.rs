//! eBay Partner Network outbound links.
//!
//! Alert cards link out to the marketplace listing they matched. When a
//! campaign id is configured, eBay links carry EPN tracking parameters
//! so the click is attributed to the campaign; without one the plain
//! listing URL is used instead.
//!
//! ## Example
//!
//! ```
//! use grail_sync::campaign::CampaignLinks;
//!
//! let links = CampaignLinks::new(Some("5339123882"));
//! let url = links.item_url("267476377265");
//! assert!(url.starts_with("https://www.ebay.com/itm/267476377265?"));
//! assert!(url.contains("campid=5339123882"));
//! ```

use url::form_urlencoded;

use crate::config::SyncConfig;
use crate::record::{Alert, Platform};

/// EPN market and rotation id for the US marketplace.
const MARKET_ROUTING_ID: &str = "711-53200-19255-0";

const ITEM_BASE: &str = "https://www.ebay.com/itm/";
const SEARCH_BASE: &str = "https://www.ebay.com/sch/i.html";

/// Builds outbound eBay links, campaign-tracked when configured.
#[derive(Debug, Clone, Default)]
pub struct CampaignLinks {
    campaign_id: Option<String>,
    custom_id: Option<String>,
}

impl CampaignLinks {
    pub fn new(campaign_id: Option<impl Into<String>>) -> Self {
        CampaignLinks {
            campaign_id: campaign_id.map(Into::into),
            custom_id: None,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.campaign_id())
    }

    /// Tag built links with a sub-campaign tracking id.
    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    /// Deep link to one eBay item.
    ///
    /// With a campaign id the link carries the EPN tracking parameters
    /// (`mkcid=1` marks an affiliate link, `mkevt=1` an item page view).
    /// Without one it falls back to the bare item URL.
    pub fn item_url(&self, item_id: &str) -> String {
        let plain = format!("{}{}", ITEM_BASE, item_id);
        let campaign = match &self.campaign_id {
            Some(campaign) => campaign,
            None => {
                tracing::warn!("ebay campaign id not configured; using direct link");
                return plain;
            }
        };

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("mkcid", "1")
            .append_pair("mkrid", MARKET_ROUTING_ID)
            .append_pair("siteid", "0")
            .append_pair("campid", campaign)
            .append_pair("customid", self.custom_id.as_deref().unwrap_or(""))
            .append_pair("toolid", "10001")
            .append_pair("mkevt", "1")
            .finish();
        format!("{}?{}", plain, query)
    }

    /// eBay search results link for a query string.
    ///
    /// With a campaign id the link routes through the EPN rover redirect
    /// with the search URL as its destination.
    pub fn search_url(&self, query: &str) -> String {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .append_pair("_nkw", query)
            .finish();
        let search = format!("{}?{}", SEARCH_BASE, encoded);

        let campaign = match &self.campaign_id {
            Some(campaign) => campaign,
            None => return search,
        };

        // The rover redirect decodes mpre itself. Encoding the search URL
        // again would double-encode the destination, so the query string
        // is assembled by hand.
        format!(
            "https://rover.ebay.com/rover/1/{}/1?ff3=4&pub={}&toolid=10001&campid={}&customid={}&mpre={}",
            MARKET_ROUTING_ID,
            campaign,
            campaign,
            self.custom_id.as_deref().unwrap_or(""),
            search
        )
    }

    /// The outbound link for an alert's listing.
    ///
    /// eBay listings with a known item id get the campaign-tracked deep
    /// link. Everything else falls back to the listing URL, which some
    /// platforms omit.
    pub fn alert_url(&self, alert: &Alert) -> Option<String> {
        if alert.listing.platform == Platform::Ebay {
            if let Some(item_id) = &alert.listing.ebay_item_id {
                return Some(self.item_url(item_id));
            }
        }
        alert.listing.url.clone()
    }
}
