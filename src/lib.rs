//! Live-synced client engine for comic grail hunting.
//!
//! A grail search describes a book the user is after: a series, an issue
//! number, a certified grade window, and the marketplaces to watch. The
//! backend scans listings and records every hit as an alert. This crate
//! is the client side of that loop. It keeps cached snapshots of the
//! user's searches and alerts, refreshes them through pluggable stores,
//! and listens to a change feed so a row inserted by the scanner shows
//! up without anyone pressing reload.
//!
//! Change-feed events are treated purely as invalidation signals. The
//! cache settles only by refetching through the store, so a partial or
//! out-of-order payload can never corrupt what a screen shows.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use grail_sync::api::HttpStore;
//! use grail_sync::identity::StaticIdentity;
//! use grail_sync::record::{Platform, SearchDraft};
//! use grail_sync::sync::SearchSync;
//! use grail_sync::SyncConfig;
//!
//! let config = SyncConfig::from_env();
//! let identity = Arc::new(StaticIdentity::user("user-1").with_token("..."));
//! let store = Arc::new(HttpStore::new(&config, identity.clone())?);
//!
//! // `feed` is any ChangeFeed implementation, e.g. a websocket bridge.
//! let searches = SearchSync::open(store, feed, identity, &config);
//! searches.on_change(|snapshot| render(snapshot));
//!
//! let draft = SearchDraft::new(2062, "129").with_platforms([Platform::Ebay]);
//! searches.create(&draft)?;
//! ```
//!
//! The in-memory backends ([`api::InMemoryStore`], [`feed::InMemoryFeed`])
//! run the same engine without a server, which is how the test suites
//! drive it.

// The derive macros refer to this crate by name.
extern crate self as grail_sync;

pub mod api;
pub mod campaign;
pub mod config;
pub mod feed;
pub mod grade;
pub mod identity;
#[cfg(feature = "emitter")]
pub mod notify;
pub mod record;
pub mod sync;
pub mod validate;

pub use config::SyncConfig;
pub use grade::{Grade, GradeRange, GradeValue, GRADE_SCALE};
pub use record::TableRecord;
pub use sync::{AlertSync, CollectionSnapshot, SearchSync, SyncError};
