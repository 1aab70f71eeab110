//! Live-synced alert inbox.

use std::sync::Arc;

use crate::api::{AlertQuery, AlertStore, ApiError};
use crate::config::SyncConfig;
use crate::feed::{ChangeEvent, ChangeFeed, ChangeOp, SubscriptionFilter};
use crate::identity::IdentityProvider;
use crate::record::{Alert, TableRecord};

use super::handle::{SyncHandle, SyncStats};
use super::state::CollectionSnapshot;

#[cfg(feature = "emitter")]
use crate::notify::{AlertNotice, NotificationHub};

/// One page of the user's alerts, kept in sync with the backend.
///
/// Alerts are read-only from the client; the scanner writes them. The
/// handle refetches on every insert notification and raises the
/// new-alert signal once per notification, so a toast never fires twice
/// because two refetches coalesced.
pub struct AlertSync {
    handle: SyncHandle<Alert>,
}

impl AlertSync {
    /// Open a live alert page for the given filters.
    pub fn open(
        store: Arc<dyn AlertStore>,
        query: AlertQuery,
        feed: Arc<dyn ChangeFeed>,
        identity: Arc<dyn IdentityProvider>,
        config: &SyncConfig,
    ) -> Self {
        let handle = SyncHandle::open(
            move |user| match user {
                Some(user) => store.list_alerts(user, &query),
                None => Err(ApiError::status(
                    401,
                    "UNAUTHENTICATED",
                    "Sign in to load alerts",
                )),
            },
            vec![SubscriptionFilter::table(Alert::TABLE).with_ops([ChangeOp::Insert])],
            feed,
            identity,
            config.poll_interval(),
        );
        AlertSync { handle }
    }

    pub fn handle(&self) -> &SyncHandle<Alert> {
        &self.handle
    }

    pub fn snapshot(&self) -> CollectionSnapshot<Alert> {
        self.handle.snapshot()
    }

    /// The cached page of alerts, newest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.handle.items()
    }

    pub fn refresh(&self) {
        self.handle.refresh();
    }

    pub fn on_change(&self, watcher: impl Fn(&CollectionSnapshot<Alert>) + Send + Sync + 'static) {
        self.handle.on_change(watcher);
    }

    /// Listen for insert notifications: exactly one call per
    /// notification, fired before the refetch it triggers.
    pub fn on_new_alert(&self, listener: impl Fn(&ChangeEvent) + Send + Sync + 'static) {
        self.handle.on_new_item(listener);
    }

    /// Forward new-alert signals to a notification hub as decoded
    /// notices. Undecodable payloads are skipped; the refetch still
    /// carries the authoritative row.
    #[cfg(feature = "emitter")]
    pub fn bind_hub(&self, hub: Arc<NotificationHub>) {
        self.handle.on_new_item(move |event| match event.decode::<Alert>() {
            Ok(alert) => hub.notify_new_alert(&AlertNotice::for_alert(&alert)),
            Err(err) => {
                tracing::debug!(error = %err, "insert payload not decodable as an alert");
            }
        });
    }

    pub fn close(self) -> SyncStats {
        self.handle.close()
    }
}
