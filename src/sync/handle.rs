//! Handle to a live collection and the state it shares with its worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::api::{ApiError, Page};
use crate::feed::{ChangeEvent, ChangeFeed, SubscriptionFilter};
use crate::identity::IdentityProvider;
use crate::record::TableRecord;

use super::state::CollectionSnapshot;
use super::worker;

/// Control messages from the handle to its worker.
pub(crate) enum Command {
    Refresh,
    Stop,
}

/// Counters from the worker thread, returned by [`SyncHandle::close`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    /// Fetches attempted, including failed ones.
    pub fetches: usize,
    /// Feed events drained.
    pub events: usize,
    /// Wait cycles completed.
    pub polls: usize,
}

/// State shared between a handle and its worker thread.
///
/// The snapshot has exactly one writer at a time: the worker applies
/// fetch results, and the handle's mutation helpers apply optimistic
/// edits. Both go through [`Shared::update`], which notifies watchers
/// after releasing the lock.
pub(crate) struct Shared<R> {
    snapshot: RwLock<CollectionSnapshot<R>>,
    user: RwLock<Option<String>>,
    closed: AtomicBool,
    watchers: RwLock<Vec<Box<dyn Fn(&CollectionSnapshot<R>) + Send + Sync>>>,
    insert_listeners: RwLock<Vec<Box<dyn Fn(&ChangeEvent) + Send + Sync>>>,
}

impl<R: TableRecord> Shared<R> {
    pub(crate) fn new() -> Self {
        Shared {
            snapshot: RwLock::new(CollectionSnapshot::initial()),
            user: RwLock::new(None),
            closed: AtomicBool::new(false),
            watchers: RwLock::new(Vec::new()),
            insert_listeners: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn snapshot(&self) -> CollectionSnapshot<R> {
        self.snapshot.read().unwrap().clone()
    }

    /// Apply a change to the snapshot, then notify watchers outside the
    /// lock.
    pub(crate) fn update(&self, apply: impl FnOnce(&mut CollectionSnapshot<R>)) {
        let after = {
            let mut snapshot = self.snapshot.write().unwrap();
            apply(&mut snapshot);
            snapshot.clone()
        };
        let watchers = self.watchers.read().unwrap();
        for watcher in watchers.iter() {
            watcher(&after);
        }
    }

    pub(crate) fn set_user(&self, user: Option<String>) {
        *self.user.write().unwrap() = user;
    }

    pub(crate) fn user(&self) -> Option<String> {
        self.user.read().unwrap().clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn emit_insert(&self, event: &ChangeEvent) {
        let listeners = self.insert_listeners.read().unwrap();
        for listener in listeners.iter() {
            listener(event);
        }
    }
}

/// A live view of one backend collection.
///
/// Opening a handle spawns a worker thread that owns the sync loop:
/// resolve identity, subscribe to the change feed, fetch, then refetch
/// whenever a notification or a [`refresh`](Self::refresh) arrives.
/// Dropping the handle signals the worker to stop; [`close`](Self::close)
/// also waits for it and hands back its counters.
pub struct SyncHandle<R: TableRecord> {
    shared: Arc<Shared<R>>,
    control: mpsc::Sender<Command>,
    worker: Option<JoinHandle<SyncStats>>,
}

impl<R: TableRecord + 'static> SyncHandle<R> {
    /// Open a handle over a fetch function and a set of feed filters.
    ///
    /// The worker scopes each filter to the resolved user before
    /// subscribing; with no signed-in user it skips subscribing entirely
    /// and the handle is pull-only.
    pub(crate) fn open<F>(
        fetch: F,
        filters: Vec<SubscriptionFilter>,
        feed: Arc<dyn ChangeFeed>,
        identity: Arc<dyn IdentityProvider>,
        poll_interval: Duration,
    ) -> Self
    where
        F: Fn(Option<&str>) -> Result<Page<R>, ApiError> + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let (control, control_rx) = mpsc::channel();
        let worker = worker::spawn(
            Arc::clone(&shared),
            fetch,
            filters,
            feed,
            identity,
            poll_interval,
            control_rx,
        );
        SyncHandle {
            shared,
            control,
            worker: Some(worker),
        }
    }

    /// The current cached state. Cheap to call from any thread.
    pub fn snapshot(&self) -> CollectionSnapshot<R> {
        self.shared.snapshot()
    }

    /// The cached rows alone.
    pub fn items(&self) -> Vec<R> {
        self.snapshot().items
    }

    /// The user the worker resolved at open. `None` while resolving and
    /// for anonymous sessions.
    pub fn user_id(&self) -> Option<String> {
        self.shared.user()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Ask the worker for a refetch. Returns immediately; bursts of
    /// requests coalesce into one fetch per loop pass.
    pub fn refresh(&self) {
        let _ = self.control.send(Command::Refresh);
    }

    /// Watch snapshot changes. The watcher runs on whichever thread
    /// applied the change, with the lock already released.
    pub fn on_change(&self, watcher: impl Fn(&CollectionSnapshot<R>) + Send + Sync + 'static) {
        self.shared.watchers.write().unwrap().push(Box::new(watcher));
    }

    /// Listen for insert notifications on this collection's table. Fires
    /// exactly once per notification, before the refetch it triggers.
    pub fn on_new_item(&self, listener: impl Fn(&ChangeEvent) + Send + Sync + 'static) {
        self.shared
            .insert_listeners
            .write()
            .unwrap()
            .push(Box::new(listener));
    }

    /// Stop the worker and wait for it to finish. After this returns the
    /// snapshot never changes again.
    pub fn close(mut self) -> SyncStats {
        self.shared.close();
        let _ = self.control.send(Command::Stop);
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_default(),
            None => SyncStats::default(),
        }
    }

    /// Optimistically drop matching rows, returning the previous rows for
    /// rollback. `None` when the handle is already closed.
    pub(crate) fn remove_where(&self, predicate: impl Fn(&R) -> bool) -> Option<Vec<R>> {
        if self.is_closed() {
            return None;
        }
        let mut previous = Vec::new();
        self.shared.update(|snapshot| {
            previous = snapshot.items.clone();
            snapshot.items.retain(|item| !predicate(item));
            snapshot.total = snapshot.items.len() as u64;
        });
        Some(previous)
    }

    /// Put back rows captured by [`remove_where`](Self::remove_where),
    /// exactly as they were.
    pub(crate) fn restore(&self, previous: Vec<R>) {
        self.shared.update(|snapshot| {
            snapshot.items = previous;
            snapshot.total = snapshot.items.len() as u64;
        });
    }
}

impl<R: TableRecord> Drop for SyncHandle<R> {
    fn drop(&mut self) {
        self.shared.close();
        let _ = self.control.send(Command::Stop);
    }
}
