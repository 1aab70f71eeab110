//! Live-synced saved searches, with mutations.

use std::sync::Arc;

use crate::api::{ApiError, Page, SearchStore};
use crate::config::SyncConfig;
use crate::feed::{ChangeFeed, ChangeOp, SubscriptionFilter};
use crate::identity::IdentityProvider;
use crate::record::{Alert, GrailSearch, SearchDraft, SearchPatch, SearchStats, TableRecord};

use super::handle::{SyncHandle, SyncStats};
use super::state::{CollectionSnapshot, SyncError};

/// The user's saved searches, kept in sync with the backend.
///
/// Mutations go to the store first and settle the cache with a refetch.
/// The exception is [`delete`](Self::delete), which removes the row from
/// the cache before the request goes out so the UI never shows a search
/// the user just deleted, and rolls the removal back if the backend
/// refuses.
pub struct SearchSync {
    handle: SyncHandle<GrailSearch>,
    store: Arc<dyn SearchStore>,
}

impl SearchSync {
    /// Open the live search list.
    ///
    /// Subscribes to the user's search rows (every operation) and to
    /// alert inserts, because each new alert bumps a search's alert
    /// count.
    pub fn open(
        store: Arc<dyn SearchStore>,
        feed: Arc<dyn ChangeFeed>,
        identity: Arc<dyn IdentityProvider>,
        config: &SyncConfig,
    ) -> Self {
        let fetch_store = Arc::clone(&store);
        let handle = SyncHandle::open(
            move |user| match user {
                Some(user) => fetch_store.list_searches(user).map(Page::all),
                None => Err(ApiError::status(
                    401,
                    "UNAUTHENTICATED",
                    "Sign in to load saved searches",
                )),
            },
            vec![
                SubscriptionFilter::table(GrailSearch::TABLE),
                SubscriptionFilter::table(Alert::TABLE).with_ops([ChangeOp::Insert]),
            ],
            feed,
            identity,
            config.poll_interval(),
        );
        SearchSync { handle, store }
    }

    pub fn handle(&self) -> &SyncHandle<GrailSearch> {
        &self.handle
    }

    pub fn snapshot(&self) -> CollectionSnapshot<GrailSearch> {
        self.handle.snapshot()
    }

    /// The cached searches, newest first.
    pub fn searches(&self) -> Vec<GrailSearch> {
        self.handle.items()
    }

    /// Dashboard numbers for the cached searches.
    pub fn stats(&self) -> SearchStats {
        SearchStats::of(&self.handle.items())
    }

    pub fn refresh(&self) {
        self.handle.refresh();
    }

    pub fn on_change(
        &self,
        watcher: impl Fn(&CollectionSnapshot<GrailSearch>) + Send + Sync + 'static,
    ) {
        self.handle.on_change(watcher);
    }

    pub fn close(self) -> SyncStats {
        self.handle.close()
    }

    fn user(&self) -> Result<String, SyncError> {
        if self.handle.is_closed() {
            return Err(SyncError::Closed);
        }
        self.handle.user_id().ok_or(SyncError::NotAuthenticated)
    }

    /// Save a new search. The cache settles via refetch on success.
    pub fn create(&self, draft: &SearchDraft) -> Result<GrailSearch, SyncError> {
        let user = self.user()?;
        let created = self.store.create_search(&user, draft)?;
        self.handle.refresh();
        Ok(created)
    }

    pub fn update(&self, id: &str, patch: &SearchPatch) -> Result<GrailSearch, SyncError> {
        let user = self.user()?;
        let updated = self.store.update_search(&user, id, patch)?;
        self.handle.refresh();
        Ok(updated)
    }

    /// Pause or resume one search.
    pub fn set_active(&self, id: &str, active: bool) -> Result<GrailSearch, SyncError> {
        let user = self.user()?;
        let updated = self.store.set_search_active(&user, id, active)?;
        self.handle.refresh();
        Ok(updated)
    }

    /// Delete a search, optimistically.
    ///
    /// The row disappears from the cache before the request is issued.
    /// On failure the previous rows are restored exactly as they were.
    /// Either way the cache settles with a refetch.
    pub fn delete(&self, id: &str) -> Result<(), SyncError> {
        let user = self.user()?;
        let previous = match self.handle.remove_where(|search| search.id == id) {
            Some(previous) => previous,
            None => return Err(SyncError::Closed),
        };

        let result = self.store.delete_search(&user, id);
        if let Err(err) = &result {
            tracing::warn!(search = id, error = %err, "delete failed; restoring cached rows");
            self.handle.restore(previous);
        }
        self.handle.refresh();
        result.map_err(SyncError::from)
    }
}
