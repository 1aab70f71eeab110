use chrono::{DateTime, Utc};
use grail_sync_macros::TableRecord;
use serde::{Deserialize, Serialize};

use crate::grade::GradeValue;
use crate::record::Platform;

/// A match produced by the listing scanner for one of the user's searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TableRecord)]
#[serde(rename_all = "camelCase")]
#[table_record(table = "search_results")]
pub struct Alert {
    #[table_record(id)]
    pub id: String,
    pub search_id: String,
    /// Enough of the originating search to render the alert standalone.
    pub search: SearchContext,
    pub listing: Listing,
    /// Exact criteria hit, as opposed to a near miss.
    pub is_direct_match: bool,
    pub notification_sent: bool,
    pub notification_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The slice of the originating search embedded in an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContext {
    pub series: SeriesRef,
    pub issue_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRef {
    pub title: String,
    pub volume: u32,
}

/// The marketplace listing an alert points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub title: String,
    pub price: f64,
    pub grade: GradeValue,
    pub page_quality: Option<String>,
    pub grading_authority: Option<String>,
    pub url: Option<String>,
    pub platform: Platform,
    /// Set for eBay listings; drives campaign-tracked outbound links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebay_item_id: Option<String>,
}

impl Alert {
    /// Card headline: `"Title #N"`.
    pub fn headline(&self) -> String {
        format!("{} #{}", self.search.series.title, self.search.issue_number)
    }
}
