//! Push behavior: the list moves when another session or the scanner
//! writes, with no refresh call anywhere.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use grail_sync::api::SearchStore;
use grail_sync::feed::InMemoryFeed;

use crate::support::{alert_for, draft, open, seeded_store, settled, wait_until, USER};

#[test]
fn another_sessions_changes_arrive_without_a_refresh() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    // A second device saves a search; only the feed connects the two.
    let created = store.create_search(USER, &draft()).unwrap();
    assert!(wait_until(|| sync.searches().len() == 1));
    assert_eq!(sync.searches()[0].id, created.id);

    store.delete_search(USER, &created.id).unwrap();
    assert!(wait_until(|| sync.snapshot().is_empty()));

    let stats = sync.close();
    assert_eq!(stats.events, 2);
}

#[test]
fn other_users_rows_never_cross_the_subscription() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    store.create_search("user-2", &draft()).unwrap();
    std::thread::sleep(Duration::from_millis(120));
    assert!(sync.snapshot().is_empty());

    store.create_search(USER, &draft()).unwrap();
    assert!(wait_until(|| sync.searches().len() == 1));
    assert!(sync.searches().iter().all(|search| search.user_id == USER));

    let stats = sync.close();
    assert_eq!(stats.events, 1);
}

#[test]
fn a_new_alert_bumps_the_alert_count() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    let created = sync.create(&draft()).unwrap();
    assert!(wait_until(|| sync.searches().len() == 1));
    assert_eq!(sync.searches()[0].alert_count, Some(0));

    // The scanner writes to a different table. The count is derived per
    // list response, so the alert insert notification is what makes it
    // visible here.
    store.record_alert(USER, alert_for("a-1", &created.id, "2026-08-10T09:00:00Z"));
    assert!(wait_until(|| {
        sync.searches().first().and_then(|search| search.alert_count) == Some(1)
    }));
    sync.close();
}

#[test]
fn the_insert_signal_fires_for_search_rows_only() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    let inserts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inserts);
    sync.handle().on_new_item(move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let created = store.create_search(USER, &draft()).unwrap();
    assert!(wait_until(|| inserts.load(Ordering::SeqCst) == 1));

    // An alert insert refreshes the list but is not a search row.
    store.record_alert(USER, alert_for("a-1", &created.id, "2026-08-10T09:00:00Z"));
    assert!(wait_until(|| {
        sync.searches().first().and_then(|search| search.alert_count) == Some(1)
    }));
    assert_eq!(inserts.load(Ordering::SeqCst), 1);

    // Updates and deletes on search rows refetch silently.
    store.set_search_active(USER, &created.id, false).unwrap();
    assert!(wait_until(|| {
        sync.searches().first().map(|search| !search.is_active) == Some(true)
    }));
    store.delete_search(USER, &created.id).unwrap();
    assert!(wait_until(|| sync.snapshot().is_empty()));
    assert_eq!(inserts.load(Ordering::SeqCst), 1);
    sync.close();
}
