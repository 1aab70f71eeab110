//! Domain records synced from the backing tables.
//!
//! Every record type carries its backing table name through the
//! [`TableRecord`] trait, so the sync engine and the change feed can be
//! scoped to a table without knowing the concrete type. Wire shapes are
//! camelCase JSON, matching what the REST endpoints and the push channel
//! deliver.
//!
//! ## Example
//!
//! ```ignore
//! use grail_sync::{TableRecord, GrailSearch};
//!
//! fn table_of<R: TableRecord>() -> &'static str {
//!     R::TABLE
//! }
//!
//! assert_eq!(table_of::<GrailSearch>(), "user_grail_searches");
//! ```

mod alert;
mod platform;
mod search;
mod series;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that live in a named backing table.
pub trait TableRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The table this record type is synced from (e.g. "user_grail_searches").
    const TABLE: &'static str;

    /// Returns the unique identifier for this record instance.
    fn id(&self) -> &str;
}

pub use alert::{Alert, Listing, SearchContext, SeriesRef};
pub use platform::Platform;
pub use search::{GrailSearch, SearchDraft, SearchPatch, SearchStats};
pub use series::ComicSeries;
