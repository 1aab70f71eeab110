//! Change feed - push notifications for row changes.
//!
//! The feed is the push half of the sync engine: the server (or the
//! in-memory stand-in) publishes a [`ChangeEvent`] whenever a row in a
//! watched table changes, and subscribers receive the events that match
//! their [`SubscriptionFilter`]. Delivery is at-least-once and unordered
//! relative to REST responses, so consumers treat events as invalidation
//! signals, never as authoritative row images.
//!
//! ## Usage
//!
//! ```
//! use grail_sync::feed::{ChangeEvent, ChangeFeed, ChangeOp, InMemoryFeed, SubscriptionFilter};
//!
//! let feed = InMemoryFeed::new();
//! let sub = feed
//!     .subscribe(SubscriptionFilter::table("search_results").with_ops([ChangeOp::Insert]))
//!     .unwrap();
//!
//! feed.publish(ChangeEvent::new("evt-1", "search_results", ChangeOp::Insert, Vec::new()));
//!
//! let event = sub.poll(100).unwrap().unwrap();
//! assert_eq!(event.op, ChangeOp::Insert);
//! ```

mod in_memory;

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::record::TableRecord;

pub use in_memory::InMemoryFeed;

/// Kind of row change a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeOp::Insert => f.write_str("INSERT"),
            ChangeOp::Update => f.write_str("UPDATE"),
            ChangeOp::Delete => f.write_str("DELETE"),
        }
    }
}

/// A change notification from the push channel.
///
/// The payload is the serialized row image as the channel delivered it. It
/// may be partial or differently shaped than a list item, which is why the
/// sync engine only ever treats events as refetch signals.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChangeEvent {
    pub id: String,
    pub table: String,
    pub op: ChangeOp,
    /// Owning user, when the channel is user-scoped.
    pub user_id: Option<String>,
    #[serde(with = "payload_serde")]
    pub payload: Vec<u8>,
    pub occurred_at: DateTime<Utc>,
}

mod payload_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(payload: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(payload).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

impl ChangeEvent {
    pub fn new(
        id: impl Into<String>,
        table: impl Into<String>,
        op: ChangeOp,
        payload: Vec<u8>,
    ) -> Self {
        ChangeEvent {
            id: id.into(),
            table: table.into(),
            op,
            user_id: None,
            payload,
            occurred_at: Utc::now(),
        }
    }

    /// Build an event for a record, with a fresh id and the record's table.
    pub fn for_record<R: TableRecord>(op: ChangeOp, record: &R) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(record)?;
        Ok(Self::new(
            uuid::Uuid::new_v4().to_string(),
            R::TABLE,
            op,
            payload,
        ))
    }

    /// Scope the event to an owning user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Deserialize the payload row image.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// The payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Server-side filter for a feed subscription.
///
/// An empty op list matches every operation. A user-scoped filter only
/// matches events that carry the same owning user; events without a user
/// are not delivered to scoped subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub table: String,
    pub ops: Vec<ChangeOp>,
    pub user_id: Option<String>,
}

impl SubscriptionFilter {
    pub fn table(table: impl Into<String>) -> Self {
        SubscriptionFilter {
            table: table.into(),
            ops: Vec::new(),
            user_id: None,
        }
    }

    pub fn with_ops(mut self, ops: impl IntoIterator<Item = ChangeOp>) -> Self {
        self.ops = ops.into_iter().collect();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if event.table != self.table {
            return false;
        }
        if !self.ops.is_empty() && !self.ops.contains(&event.op) {
            return false;
        }
        match &self.user_id {
            Some(user_id) => event.user_id.as_deref() == Some(user_id.as_str()),
            None => true,
        }
    }
}

/// Error type for feed operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Channel handshake or transport failure while subscribing.
    SubscribeFailed(String),
    /// Connection to the feed was lost.
    ConnectionLost(String),
    /// The subscription was released.
    Closed,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::SubscribeFailed(msg) => write!(f, "subscribe failed: {}", msg),
            FeedError::ConnectionLost(msg) => write!(f, "feed connection lost: {}", msg),
            FeedError::Closed => write!(f, "subscription closed"),
        }
    }
}

impl Error for FeedError {}

/// A push channel delivering row-change notifications.
///
/// Implementations might include:
/// - `InMemoryFeed` - For testing and single-process scenarios
/// - A realtime websocket channel on the hosted backend
///
/// Reconnection policy belongs to the implementation; consumers only
/// re-subscribe when they open a fresh handle.
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription. Only events published after this call are
    /// delivered.
    fn subscribe(&self, filter: SubscriptionFilter) -> Result<Box<dyn FeedSubscription>, FeedError>;
}

/// A live subscription on a change feed.
pub trait FeedSubscription: Send {
    /// Poll for the next matching event, blocking up to the timeout.
    ///
    /// Returns `Ok(None)` on timeout and `Err(FeedError::Closed)` once the
    /// subscription has been released.
    fn poll(&self, timeout_ms: u64) -> Result<Option<ChangeEvent>, FeedError>;

    /// Release the subscription. Idempotent.
    fn unsubscribe(&self);
}
