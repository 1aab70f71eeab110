//! Shared wiring for the engine tests: in-memory backend plus feed,
//! alert fixtures, and deadline polling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use grail_sync::api::{AlertQuery, InMemoryStore};
use grail_sync::feed::InMemoryFeed;
use grail_sync::identity::StaticIdentity;
use grail_sync::record::{Alert, ComicSeries, Listing, Platform, SearchContext, SearchDraft, SeriesRef};
use grail_sync::{AlertSync, Grade, SyncConfig};

pub const USER: &str = "user-1";

pub fn config() -> SyncConfig {
    SyncConfig::new().with_poll_interval(Duration::from_millis(5))
}

pub fn seeded_store(feed: &InMemoryFeed) -> InMemoryStore {
    let store = InMemoryStore::new().with_feed(feed.clone());
    store.seed_series([ComicSeries {
        id: 101,
        title: "The Amazing Spider-Man".to_string(),
        volume: 1,
        year_range: "1963-1998".to_string(),
        series_type: "Ongoing".to_string(),
        publisher: "Marvel".to_string(),
        display_name: None,
    }]);
    store
}

pub fn draft() -> SearchDraft {
    SearchDraft::new(101, "129").with_platforms([Platform::Ebay])
}

pub fn alert_at(id: &str, created_at: &str) -> Alert {
    let created_at: DateTime<Utc> = created_at.parse().unwrap();
    Alert {
        id: id.to_string(),
        search_id: "srch-1".to_string(),
        search: SearchContext {
            series: SeriesRef {
                title: "The Amazing Spider-Man".to_string(),
                volume: 1,
            },
            issue_number: "129".to_string(),
        },
        listing: Listing {
            title: "ASM 129 CGC 9.0 first Punisher".to_string(),
            price: 1450.0,
            grade: Grade::from_f64(9.0),
            page_quality: Some("White".to_string()),
            grading_authority: Some("CGC".to_string()),
            url: Some("https://www.ebay.com/itm/267476377265".to_string()),
            platform: Platform::Ebay,
            ebay_item_id: Some("267476377265".to_string()),
        },
        is_direct_match: true,
        notification_sent: false,
        notification_sent_at: None,
        created_at,
    }
}

pub fn open_alerts(store: &InMemoryStore, feed: &InMemoryFeed) -> AlertSync {
    init_logging();
    AlertSync::open(
        Arc::new(store.clone()),
        AlertQuery::new(),
        Arc::new(feed.clone()),
        Arc::new(StaticIdentity::user(USER)),
        &config(),
    )
}

/// Route worker logs through the test harness when `RUST_LOG` asks.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll until the condition holds, for up to two seconds.
pub fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    check()
}

/// Wait for the opening fetch to land.
pub fn settled(sync: &AlertSync) {
    assert!(
        wait_until(|| !sync.snapshot().loading),
        "initial fetch never settled"
    );
}
