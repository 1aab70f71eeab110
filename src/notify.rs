//! Toast-style notifications for newly found alerts.
//!
//! The sync engine raises a signal for every alert row the scanner
//! inserts. [`NotificationHub`] fans that signal out to any number of
//! listeners (a desktop toast, a sound, a tray badge) without the
//! listeners knowing about the engine. Payloads cross the emitter as
//! JSON strings; [`NotificationHub::on_new_alert`] hides the decoding.
//!
//! Delivery is fire-and-forget on the emitter's own thread, so tests
//! allow a short delay before asserting.

use std::sync::Mutex;

use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};

use crate::record::Alert;

/// Event name emitted once per inserted alert row.
pub const NEW_ALERT_EVENT: &str = "new-alert";

/// What a notification shows about a freshly matched listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotice {
    /// The search that matched, as `"Title #N"`.
    pub search_title: String,
    pub listing_title: String,
    pub is_direct_match: bool,
}

impl AlertNotice {
    pub fn for_alert(alert: &Alert) -> Self {
        AlertNotice {
            search_title: alert.headline(),
            listing_title: alert.listing.title.clone(),
            is_direct_match: alert.is_direct_match,
        }
    }
}

/// Fan-out point for alert notifications.
///
/// ## Usage
///
/// ```
/// use grail_sync::notify::NotificationHub;
///
/// let hub = NotificationHub::new();
/// hub.on_new_alert(|notice| {
///     println!("new grail found: {}", notice.search_title);
/// });
/// ```
pub struct NotificationHub {
    emitter: Mutex<EventEmitter>,
}

impl NotificationHub {
    pub fn new() -> Self {
        NotificationHub {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for new-alert notifications.
    pub fn on_new_alert<F>(&self, listener: F)
    where
        F: Fn(AlertNotice) + Send + Sync + 'static,
    {
        self.on(NEW_ALERT_EVENT, move |payload| {
            match serde_json::from_str::<AlertNotice>(&payload) {
                Ok(notice) => listener(notice),
                Err(err) => {
                    tracing::debug!(error = %err, "discarding notification with malformed payload")
                }
            }
        });
    }

    /// Emit a new-alert notification to every listener.
    pub fn notify_new_alert(&self, notice: &AlertNotice) {
        match serde_json::to_string(notice) {
            Ok(payload) => self.emit(NEW_ALERT_EVENT, payload),
            Err(err) => tracing::debug!(error = %err, "could not encode notification payload"),
        }
    }

    /// Register a raw listener. Payloads arrive as JSON strings.
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.lock().unwrap().on(event, listener);
    }

    /// Emit a raw event immediately.
    pub fn emit(&self, event: &str, payload: impl Into<String>) {
        self.emitter.lock().unwrap().emit(event, payload.into());
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
