//! Snapshot state shared between a sync handle and its worker.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::api::ApiError;
use crate::feed::FeedError;
use crate::identity::IdentityError;

/// Error type for sync operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Identity could not be resolved while opening the handle.
    Identity(IdentityError),
    /// The push subscription could not be opened; the handle runs
    /// pull-only.
    Subscribe(FeedError),
    /// A fetch or mutation against the backing store failed.
    Api(ApiError),
    /// A mutation needs a signed-in user and none is resolved.
    NotAuthenticated,
    /// The handle was already closed.
    Closed,
}

impl SyncError {
    /// The underlying store error, when there is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            SyncError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Identity(err) => write!(f, "identity: {}", err),
            SyncError::Subscribe(err) => write!(f, "subscribe: {}", err),
            SyncError::Api(err) => write!(f, "{}", err),
            SyncError::NotAuthenticated => f.write_str("not signed in"),
            SyncError::Closed => f.write_str("sync handle closed"),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        SyncError::Api(err)
    }
}

impl From<FeedError> for SyncError {
    fn from(err: FeedError) -> Self {
        SyncError::Subscribe(err)
    }
}

impl From<IdentityError> for SyncError {
    fn from(err: IdentityError) -> Self {
        SyncError::Identity(err)
    }
}

/// What the UI renders: the cached rows plus sync status.
///
/// `items` always holds the last successfully fetched rows; a failed
/// refetch sets `error` but leaves the stale rows in place, which beats
/// a blank screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<R> {
    pub items: Vec<R>,
    /// Total rows matching the query server-side, not just this window.
    pub total: u64,
    /// True until the first fetch settles, success or not.
    pub loading: bool,
    /// Latest sync error, cleared by the next successful fetch.
    pub error: Option<SyncError>,
    pub last_synced: Option<DateTime<Utc>>,
}

impl<R> Default for CollectionSnapshot<R> {
    fn default() -> Self {
        CollectionSnapshot {
            items: Vec::new(),
            total: 0,
            loading: false,
            error: None,
            last_synced: None,
        }
    }
}

impl<R> CollectionSnapshot<R> {
    /// The state a handle starts in, before the first fetch settles.
    pub(crate) fn initial() -> Self {
        CollectionSnapshot {
            loading: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
