//! The live sync engine.
//!
//! A sync handle keeps a local cache of one backend collection and owns
//! every write to it. The worker behind the handle follows one rule:
//! change-feed events and refresh requests are only invalidation
//! signals. The cache is settled exclusively by refetching through the
//! store, so an out-of-order or partial event payload can never corrupt
//! what the UI shows.
//!
//! [`SearchSync`] and [`AlertSync`] wrap the generic handle for the two
//! domain collections.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! use grail_sync::api::InMemoryStore;
//! use grail_sync::feed::InMemoryFeed;
//! use grail_sync::identity::StaticIdentity;
//! use grail_sync::record::{ComicSeries, Platform, SearchDraft};
//! use grail_sync::sync::SearchSync;
//! use grail_sync::SyncConfig;
//!
//! let feed = InMemoryFeed::new();
//! let store = InMemoryStore::new().with_feed(feed.clone());
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
//! let searches = SearchSync::open(
//!     Arc::new(store),
//!     Arc::new(feed),
//!     Arc::new(StaticIdentity::user("user-1")),
//!     &SyncConfig::new(),
//! );
//!
//! // Wait for the opening fetch so the worker has signed in.
//! let deadline = Instant::now() + Duration::from_secs(2);
//! while searches.snapshot().loading && Instant::now() < deadline {
//!     std::thread::sleep(Duration::from_millis(5));
//! }
//!
//! let draft = SearchDraft::new(101, "129").with_platforms([Platform::Ebay]);
//! searches.create(&draft).unwrap();
//!
//! let deadline = Instant::now() + Duration::from_secs(2);
//! while searches.snapshot().is_empty() && Instant::now() < deadline {
//!     std::thread::sleep(Duration::from_millis(5));
//! }
//! assert_eq!(searches.searches().len(), 1);
//! searches.close();
//! ```

mod alerts;
mod handle;
mod searches;
mod state;
mod worker;

pub use alerts::AlertSync;
pub use handle::{SyncHandle, SyncStats};
pub use searches::SearchSync;
pub use state::{CollectionSnapshot, SyncError};
