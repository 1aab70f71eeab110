//! The sync worker: one background thread per handle that owns the loop.
//!
//! The loop is deliberately simple. One wait point (the control channel
//! receive) doubles as the poll tick; each pass drains every pending
//! control message and feed event into a single `pending` flag, then
//! fetches at most once. A burst of notifications arriving while a fetch
//! is in flight therefore costs exactly one more fetch, not one each.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;

use crate::api::{ApiError, Page};
use crate::feed::{ChangeFeed, ChangeOp, FeedSubscription, SubscriptionFilter};
use crate::identity::IdentityProvider;
use crate::record::TableRecord;

use super::handle::{Command, Shared, SyncStats};
use super::state::SyncError;

pub(crate) fn spawn<R, F>(
    shared: Arc<Shared<R>>,
    fetch: F,
    filters: Vec<SubscriptionFilter>,
    feed: Arc<dyn ChangeFeed>,
    identity: Arc<dyn IdentityProvider>,
    poll_interval: Duration,
    control: Receiver<Command>,
) -> JoinHandle<SyncStats>
where
    R: TableRecord + 'static,
    F: Fn(Option<&str>) -> Result<Page<R>, ApiError> + Send + 'static,
{
    thread::spawn(move || {
        run(
            &shared,
            &fetch,
            &filters,
            feed.as_ref(),
            identity.as_ref(),
            poll_interval,
            &control,
        )
    })
}

fn run<R, F>(
    shared: &Shared<R>,
    fetch: &F,
    filters: &[SubscriptionFilter],
    feed: &dyn ChangeFeed,
    identity: &dyn IdentityProvider,
    poll_interval: Duration,
    control: &Receiver<Command>,
) -> SyncStats
where
    R: TableRecord,
    F: Fn(Option<&str>) -> Result<Page<R>, ApiError>,
{
    let mut stats = SyncStats::default();

    let user = resolve_identity(shared, identity);
    let mut subscriptions = open_subscriptions(shared, feed, filters, user.as_deref());
    tracing::debug!(
        table = R::TABLE,
        subscriptions = subscriptions.len(),
        "sync worker started"
    );

    refetch(shared, fetch, user.as_deref(), &mut stats);

    let mut pending = false;
    'main: loop {
        stats.polls += 1;

        match control.recv_timeout(poll_interval) {
            Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(Command::Refresh) => pending = true,
            Err(RecvTimeoutError::Timeout) => {}
        }
        loop {
            match control.try_recv() {
                Ok(Command::Stop) | Err(TryRecvError::Disconnected) => break 'main,
                Ok(Command::Refresh) => pending = true,
                Err(TryRecvError::Empty) => break,
            }
        }

        // Drain every queued event from every subscription. Events only
        // flip the pending flag; the fetch below is the sole cache write.
        let mut index = 0;
        while index < subscriptions.len() {
            let mut alive = true;
            loop {
                match subscriptions[index].poll(0) {
                    Ok(Some(event)) => {
                        stats.events += 1;
                        pending = true;
                        if event.op == ChangeOp::Insert && event.table == R::TABLE {
                            shared.emit_insert(&event);
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!(
                            table = R::TABLE,
                            error = %err,
                            "feed subscription lost; continuing pull-only"
                        );
                        alive = false;
                        break;
                    }
                }
            }
            if alive {
                index += 1;
            } else {
                subscriptions.remove(index);
            }
        }

        if shared.is_closed() {
            break;
        }
        if pending {
            refetch(shared, fetch, user.as_deref(), &mut stats);
            pending = false;
        }
    }

    for subscription in &subscriptions {
        subscription.unsubscribe();
    }
    tracing::debug!(
        table = R::TABLE,
        fetches = stats.fetches,
        events = stats.events,
        "sync worker stopped"
    );
    stats
}

fn resolve_identity<R: TableRecord>(
    shared: &Shared<R>,
    identity: &dyn IdentityProvider,
) -> Option<String> {
    match identity.current_user_id() {
        Ok(user) => {
            shared.set_user(user.clone());
            user
        }
        Err(err) => {
            tracing::warn!(error = %err, "identity resolution failed; running pull-only");
            shared.update(|snapshot| snapshot.error = Some(SyncError::Identity(err)));
            None
        }
    }
}

fn open_subscriptions<R: TableRecord>(
    shared: &Shared<R>,
    feed: &dyn ChangeFeed,
    filters: &[SubscriptionFilter],
    user: Option<&str>,
) -> Vec<Box<dyn FeedSubscription>> {
    let user = match user {
        Some(user) => user,
        None => {
            tracing::debug!(table = R::TABLE, "no signed-in user; skipping subscriptions");
            return Vec::new();
        }
    };

    let mut subscriptions = Vec::new();
    for filter in filters {
        match feed.subscribe(filter.clone().with_user(user)) {
            Ok(subscription) => subscriptions.push(subscription),
            Err(err) => {
                tracing::warn!(
                    table = filter.table.as_str(),
                    error = %err,
                    "subscribe failed; continuing pull-only"
                );
                shared.update(|snapshot| snapshot.error = Some(SyncError::Subscribe(err)));
            }
        }
    }
    subscriptions
}

/// Fetch once and settle the snapshot, unless the handle closed while
/// the request was in flight.
fn refetch<R, F>(shared: &Shared<R>, fetch: &F, user: Option<&str>, stats: &mut SyncStats)
where
    R: TableRecord,
    F: Fn(Option<&str>) -> Result<Page<R>, ApiError>,
{
    stats.fetches += 1;
    let result = fetch(user);
    if shared.is_closed() {
        return;
    }

    match result {
        Ok(page) => shared.update(|snapshot| {
            snapshot.items = page.items;
            snapshot.total = page.total;
            snapshot.error = None;
            snapshot.loading = false;
            snapshot.last_synced = Some(Utc::now());
        }),
        Err(err) => {
            tracing::warn!(table = R::TABLE, error = %err, "fetch failed; keeping cached rows");
            shared.update(|snapshot| {
                snapshot.error = Some(SyncError::Api(err));
                snapshot.loading = false;
            });
        }
    }
}
