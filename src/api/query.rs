//! Paging and filter types for list endpoints.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::record::{Alert, Platform};

/// Default page size for alert listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Whether an alert is an exact hit or a close call.
///
/// The scanner flags a listing as a direct match when every criterion of
/// the search is met, and as a near miss when it lands just outside (one
/// grade step below the minimum, slightly over budget).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    DirectMatch,
    NearMiss,
}

impl MatchKind {
    pub const ALL: [MatchKind; 2] = [MatchKind::DirectMatch, MatchKind::NearMiss];

    /// Wire string, as sent in the `matchType` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::DirectMatch => "direct_match",
            MatchKind::NearMiss => "near_miss",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MatchKind::DirectMatch => "Direct Match",
            MatchKind::NearMiss => "Near Miss",
        }
    }

    /// Whether an alert with the given match flag is of this kind.
    pub fn matches(&self, is_direct_match: bool) -> bool {
        match self {
            MatchKind::DirectMatch => is_direct_match,
            MatchKind::NearMiss => !is_direct_match,
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window into a listing: how many rows, starting where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub offset: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl PageQuery {
    pub fn new(limit: u32, offset: u32) -> Self {
        PageQuery { limit, offset }
    }

    /// The window immediately after this one.
    pub fn next(self) -> Self {
        PageQuery {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }

    /// Apply the window to an in-memory listing.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// Filters for listing alerts.
///
/// `None` in a filter slot means "all"; absent filters are left off the
/// query string entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertQuery {
    pub page: PageQuery,
    pub search_id: Option<String>,
    pub platform: Option<Platform>,
    pub match_kind: Option<MatchKind>,
    pub since: Option<DateTime<Utc>>,
}

impl AlertQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: PageQuery) -> Self {
        self.page = page;
        self
    }

    /// Only alerts raised by one search.
    pub fn with_search_id(mut self, search_id: impl Into<String>) -> Self {
        self.search_id = Some(search_id.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_match_kind(mut self, match_kind: MatchKind) -> Self {
        self.match_kind = Some(match_kind);
        self
    }

    /// Only alerts raised at or after the given moment.
    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Whether an alert passes every set filter. Paging is not considered.
    pub fn matches(&self, alert: &Alert) -> bool {
        if let Some(search_id) = &self.search_id {
            if alert.search_id != *search_id {
                return false;
            }
        }
        if let Some(platform) = self.platform {
            if alert.listing.platform != platform {
                return false;
            }
        }
        if let Some(kind) = self.match_kind {
            if !kind.matches(alert.is_direct_match) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if alert.created_at < since {
                return false;
            }
        }
        true
    }

    /// Encode as the `GET /api/alerts` query string.
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("limit", &self.page.limit.to_string());
        query.append_pair("offset", &self.page.offset.to_string());
        if let Some(platform) = self.platform {
            query.append_pair("platform", platform.as_str());
        }
        if let Some(kind) = self.match_kind {
            query.append_pair("matchType", kind.as_str());
        }
        if let Some(search_id) = &self.search_id {
            query.append_pair("searchId", search_id);
        }
        if let Some(since) = self.since {
            query.append_pair("since", &since.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        query.finish()
    }
}

/// One window of a listing plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total rows matching the filters, not just this window.
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Page { items, total }
    }

    /// A page holding an entire unpaged collection.
    pub fn all(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Page { items, total }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
