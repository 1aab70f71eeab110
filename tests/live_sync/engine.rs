//! The worker loop itself: how fetches coalesce, what close guarantees,
//! and how far a degraded handle keeps working.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use grail_sync::api::{InMemoryStore, StoreOp};
use grail_sync::feed::InMemoryFeed;
use grail_sync::identity::StaticIdentity;
use grail_sync::{SearchSync, SyncError};

use crate::support::{alert_at, config, draft, open_alerts, seeded_store, settled, wait_until, USER};

// --- Coalescing ---

#[test]
fn notification_bursts_coalesce_into_one_extra_fetch() {
    let feed = InMemoryFeed::new();
    let store = InMemoryStore::new().with_feed(feed.clone());
    let sync = open_alerts(&store, &feed);
    settled(&sync);

    // Stall the refetch the first insert triggers, then land two more
    // inserts while it is in flight.
    store.stall_next(StoreOp::ListAlerts, Duration::from_millis(150));
    store.record_alert(USER, alert_at("a-1", "2026-08-10T09:00:00Z"));
    std::thread::sleep(Duration::from_millis(40));
    store.record_alert(USER, alert_at("a-2", "2026-08-10T09:05:00Z"));
    store.record_alert(USER, alert_at("a-3", "2026-08-10T09:10:00Z"));

    assert!(wait_until(|| sync.alerts().len() == 3));
    let stats = sync.close();
    assert_eq!(stats.events, 3);
    // Opening fetch, the stalled one, and at most one catch-up pass.
    assert!(
        (2..=3).contains(&stats.fetches),
        "three inserts cost {} fetches",
        stats.fetches
    );
}

// --- Close ---

#[test]
fn a_close_during_an_in_flight_fetch_discards_the_result() {
    let feed = InMemoryFeed::new();
    let store = InMemoryStore::new().with_feed(feed.clone());
    store.record_alert(USER, alert_at("a-1", "2026-08-10T09:00:00Z"));

    let sync = open_alerts(&store, &feed);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let captures = Arc::clone(&seen);
    sync.on_change(move |snapshot| {
        let ids: Vec<String> = snapshot.items.iter().map(|alert| alert.id.clone()).collect();
        captures.lock().unwrap().push(ids);
    });
    settled(&sync);
    assert_eq!(sync.alerts().len(), 1);

    // Pin a refetch in flight, grow the data underneath it, then close.
    store.stall_next(StoreOp::ListAlerts, Duration::from_millis(300));
    sync.refresh();
    std::thread::sleep(Duration::from_millis(50));
    store.record_alert(USER, alert_at("a-2", "2026-08-10T09:05:00Z"));
    let stats = sync.close();

    // Close waited out the stalled fetch and threw its result away.
    assert_eq!(stats.fetches, 2);
    assert_eq!(stats.events, 0);
    let seen = seen.lock().unwrap();
    assert!(seen.iter().all(|ids| ids.iter().all(|id| id != "a-2")));
}

// --- Degraded modes ---

#[test]
fn anonymous_sessions_run_pull_only_with_a_401() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = SearchSync::open(
        Arc::new(store.clone()),
        Arc::new(feed.clone()),
        Arc::new(StaticIdentity::anonymous()),
        &config(),
    );
    assert!(wait_until(|| !sync.snapshot().loading));

    let snapshot = sync.snapshot();
    assert!(snapshot.is_empty());
    match snapshot.error {
        Some(SyncError::Api(ref api)) => {
            assert_eq!(api.status_code(), Some(401));
            assert_eq!(api.code(), Some("UNAUTHENTICATED"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(sync.handle().user_id(), None);

    // Nothing is subscribed, so writes elsewhere never push.
    use grail_sync::api::SearchStore;
    store.create_search("user-1", &draft()).unwrap();
    std::thread::sleep(Duration::from_millis(120));
    assert!(sync.snapshot().is_empty());

    // Mutations refuse before touching the store.
    assert_eq!(sync.create(&draft()).unwrap_err(), SyncError::NotAuthenticated);

    let stats = sync.close();
    assert_eq!(stats.events, 0);
}

#[test]
fn failed_fetches_keep_the_cached_rows() {
    let feed = InMemoryFeed::new();
    let store = InMemoryStore::new().with_feed(feed.clone());
    store.record_alert(USER, alert_at("a-1", "2026-08-10T09:00:00Z"));
    let sync = open_alerts(&store, &feed);
    settled(&sync);
    assert_eq!(sync.alerts().len(), 1);
    let first_synced = sync.snapshot().last_synced;

    store.fail_next(StoreOp::ListAlerts);
    sync.refresh();
    assert!(wait_until(|| sync.snapshot().error.is_some()));

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.items.len(), 1, "stale rows beat a blank screen");
    assert_eq!(snapshot.items[0].id, "a-1");
    match snapshot.error {
        Some(SyncError::Api(ref api)) => assert_eq!(api.code(), Some("INTERNAL_ERROR")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(snapshot.last_synced, first_synced, "a failed fetch is not a sync");

    // The next successful fetch clears the error.
    sync.refresh();
    assert!(wait_until(|| sync.snapshot().error.is_none()));
    assert_eq!(sync.alerts().len(), 1);
    sync.close();
}

#[test]
fn a_failed_subscription_degrades_to_pull_only() {
    let feed = InMemoryFeed::new();
    let store = InMemoryStore::new().with_feed(feed.clone());
    feed.fail_next_subscribe();
    let sync = open_alerts(&store, &feed);
    settled(&sync);

    // Pushed inserts never arrive...
    store.record_alert(USER, alert_at("a-1", "2026-08-10T09:00:00Z"));
    std::thread::sleep(Duration::from_millis(150));
    assert!(sync.snapshot().is_empty());

    // ...but a manual refresh still pulls.
    sync.refresh();
    assert!(wait_until(|| sync.alerts().len() == 1));

    let stats = sync.close();
    assert_eq!(stats.events, 0);
}

#[test]
fn identity_failure_leaves_the_handle_signed_out() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let identity = StaticIdentity::user(USER);
    identity.fail_next_resolution();

    let sync = SearchSync::open(
        Arc::new(store),
        Arc::new(feed),
        Arc::new(identity),
        &config(),
    );
    assert!(wait_until(|| !sync.snapshot().loading));

    assert_eq!(sync.handle().user_id(), None);
    assert!(sync.snapshot().error.is_some());
    assert_eq!(sync.create(&draft()).unwrap_err(), SyncError::NotAuthenticated);

    let stats = sync.close();
    assert_eq!(stats.events, 0);
}
