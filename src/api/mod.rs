//! REST stores - the pull half of the sync engine.
//!
//! Stores answer queries and apply mutations against the authoritative
//! backend. Responses are authoritative row images; change-feed events
//! are not. The sync engine always settles the cache with a store fetch,
//! never with event payloads.
//!
//! Implementations:
//! - [`InMemoryStore`] - For testing and single-process scenarios
//! - [`HttpStore`] - The hosted REST API (feature `http`)
//!
//! ## Usage
//!
//! ```
//! use grail_sync::api::{InMemoryStore, SearchStore, SeriesStore};
//! use grail_sync::record::{ComicSeries, Platform, SearchDraft};
//!
//! let store = InMemoryStore::new();
//! store.seed_series([ComicSeries {
//!     id: 101,
//!     title: "The Amazing Spider-Man".to_string(),
//!     volume: 1,
//!     year_range: "1963-1998".to_string(),
//!     series_type: "Ongoing".to_string(),
//!     publisher: "Marvel".to_string(),
//!     display_name: None,
//! }]);
//!
//! let draft = SearchDraft::new(101, "129").with_platforms([Platform::Ebay]);
//! let created = store.create_search("user-1", &draft).unwrap();
//! assert_eq!(created.issue_number, "129");
//! assert_eq!(store.list_searches("user-1").unwrap().len(), 1);
//! ```

mod error;
#[cfg(feature = "http")]
mod http;
mod in_memory;
mod query;

pub use error::ApiError;
#[cfg(feature = "http")]
pub use http::HttpStore;
pub use in_memory::{InMemoryStore, StoreOp};
pub use query::{AlertQuery, MatchKind, Page, PageQuery, DEFAULT_PAGE_SIZE};

use crate::record::{Alert, ComicSeries, GrailSearch, SearchDraft, SearchPatch};

/// Storage seam for saved searches.
///
/// Callers pass the owning user id explicitly. The in-memory store scopes
/// rows by it; backends fronting the hosted API derive the user from the
/// bearer token instead and accept the id for interface parity.
pub trait SearchStore: Send + Sync {
    /// All saved searches for the user, newest first.
    fn list_searches(&self, user_id: &str) -> Result<Vec<GrailSearch>, ApiError>;

    fn get_search(&self, user_id: &str, id: &str) -> Result<GrailSearch, ApiError>;

    /// Create a search from a draft. Drafts are validated before any row
    /// is written.
    fn create_search(&self, user_id: &str, draft: &SearchDraft) -> Result<GrailSearch, ApiError>;

    /// Apply a partial update. Absent patch fields are left unchanged.
    fn update_search(
        &self,
        user_id: &str,
        id: &str,
        patch: &SearchPatch,
    ) -> Result<GrailSearch, ApiError>;

    /// Pause or resume the scanner for one search without touching the
    /// rest of it.
    fn set_search_active(
        &self,
        user_id: &str,
        id: &str,
        active: bool,
    ) -> Result<GrailSearch, ApiError>;

    fn delete_search(&self, user_id: &str, id: &str) -> Result<(), ApiError>;
}

/// Storage seam for alerts raised by the scanner.
pub trait AlertStore: Send + Sync {
    /// One page of the user's alerts, newest first.
    fn list_alerts(&self, user_id: &str, query: &AlertQuery) -> Result<Page<Alert>, ApiError>;
}

/// Series catalog lookup backing the autocomplete.
pub trait SeriesStore: Send + Sync {
    /// Title search. Queries shorter than two characters return nothing.
    fn search_series(&self, query: &str) -> Result<Vec<ComicSeries>, ApiError>;
}
