//! The new-alert signal: exactly one per inserted row, decoupled from
//! how many refetches the inserts collapsed into.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use grail_sync::api::{InMemoryStore, StoreOp};
use grail_sync::feed::InMemoryFeed;
use grail_sync::record::Alert;

use crate::support::{alert_at, open_alerts, settled, wait_until, USER};

#[test]
fn one_signal_per_insert_even_when_fetches_coalesce() {
    let feed = InMemoryFeed::new();
    let store = InMemoryStore::new().with_feed(feed.clone());
    let sync = open_alerts(&store, &feed);
    settled(&sync);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let ids = Arc::clone(&seen);
    sync.on_new_alert(move |event| {
        let alert: Alert = event.decode().unwrap();
        ids.lock().unwrap().push(alert.id);
    });

    store.stall_next(StoreOp::ListAlerts, Duration::from_millis(150));
    store.record_alert(USER, alert_at("a-1", "2026-08-10T09:00:00Z"));
    std::thread::sleep(Duration::from_millis(40));
    store.record_alert(USER, alert_at("a-2", "2026-08-10T09:05:00Z"));
    store.record_alert(USER, alert_at("a-3", "2026-08-10T09:10:00Z"));
    assert!(wait_until(|| sync.alerts().len() == 3));

    let stats = sync.close();
    let seen = seen.lock().unwrap();
    assert_eq!(*seen, ["a-1", "a-2", "a-3"]);
    assert_eq!(stats.events, 3);
    assert!(stats.fetches <= 3, "signals must not multiply fetches");
}

#[cfg(feature = "emitter")]
#[test]
fn a_bound_hub_toasts_each_new_alert() {
    use grail_sync::notify::NotificationHub;

    let feed = InMemoryFeed::new();
    let store = InMemoryStore::new().with_feed(feed.clone());
    let sync = open_alerts(&store, &feed);
    settled(&sync);

    let hub = Arc::new(NotificationHub::new());
    let toasts = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&toasts);
    hub.on_new_alert(move |notice| {
        seen.lock().unwrap().push(notice);
    });
    sync.bind_hub(Arc::clone(&hub));

    store.record_alert(USER, alert_at("a-1", "2026-08-10T09:00:00Z"));
    assert!(wait_until(|| sync.alerts().len() == 1));

    // EventEmitter is async, give it time
    std::thread::sleep(Duration::from_millis(60));
    let toasts = toasts.lock().unwrap();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].search_title, "The Amazing Spider-Man #129");
    assert_eq!(toasts[0].listing_title, "ASM 129 CGC 9.0 first Punisher");
    assert!(toasts[0].is_direct_match);
    sync.close();
}
