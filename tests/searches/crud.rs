//! Mutations through the handle: the store answers first, then the
//! cache settles by refetch. Deletes are the exception and go cache
//! first.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use grail_sync::api::{ApiError, StoreOp};
use grail_sync::feed::InMemoryFeed;
use grail_sync::record::{SearchDraft, SearchPatch};

use crate::support::{draft, open, seeded_store, settled, wait_until, USER};

// --- Create ---

#[test]
fn create_lands_in_the_synced_list() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);
    assert!(sync.snapshot().is_empty());

    let created = sync.create(&draft()).unwrap();
    assert_eq!(created.user_id, USER);
    assert_eq!(created.issue_number, "129");
    assert!(created.is_active);

    assert!(wait_until(|| sync.searches().len() == 1));
    assert_eq!(sync.searches()[0].id, created.id);
    sync.close();
}

#[test]
fn invalid_drafts_surface_the_validation_details() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    // Bad issue number and no platforms: both problems come back at once.
    let err = sync.create(&SearchDraft::new(101, "12b")).unwrap_err();
    let api = err.as_api().expect("a store rejection");
    assert!(api.is_validation());
    match api {
        ApiError::Status { details, .. } => {
            assert_eq!(details.as_ref().unwrap().as_array().unwrap().len(), 2);
        }
        other => panic!("unexpected variant: {:?}", other),
    }

    assert!(sync.snapshot().is_empty());
    sync.close();
}

// --- Update and pause ---

#[test]
fn updates_settle_through_a_refetch() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    let created = sync.create(&draft()).unwrap();
    assert!(wait_until(|| sync.searches().len() == 1));

    let updated = sync
        .update(&created.id, &SearchPatch::new().with_issue_number("130"))
        .unwrap();
    assert_eq!(updated.issue_number, "130");

    assert!(wait_until(|| {
        sync.searches()
            .first()
            .map(|search| search.issue_number == "130")
            .unwrap_or(false)
    }));
    sync.close();
}

#[test]
fn pausing_a_search_updates_the_dashboard_numbers() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    let created = sync.create(&draft()).unwrap();
    assert!(wait_until(|| sync.stats().total == 1));
    assert_eq!(sync.stats().active, 1);

    sync.set_active(&created.id, false).unwrap();
    assert!(wait_until(|| sync.stats().active == 0));
    assert_eq!(sync.stats().total, 1);
    assert_eq!(sync.stats().paused(), 1);
    sync.close();
}

// --- Delete ---

#[test]
fn delete_drops_the_row_before_the_request_resolves() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    let keep = sync.create(&draft()).unwrap();
    let doomed = sync.create(&draft()).unwrap();
    assert!(wait_until(|| sync.searches().len() == 2));

    store.stall_next(StoreOp::DeleteSearch, Duration::from_millis(300));
    let started = Instant::now();
    std::thread::scope(|scope| {
        let request = scope.spawn(|| sync.delete(&doomed.id));

        // The row is gone while the request is still in flight.
        assert!(wait_until(|| sync.searches().len() == 1));
        assert!(
            started.elapsed() < Duration::from_millis(300),
            "removal waited for the backend"
        );
        assert_eq!(sync.searches()[0].id, keep.id);
        request.join().unwrap().unwrap();
    });

    assert_eq!(sync.searches().len(), 1);
    sync.close();
}

#[test]
fn failed_delete_restores_the_cached_rows() {
    let feed = InMemoryFeed::new();
    let store = seeded_store(&feed);
    let sync = open(&store, &feed);
    settled(&sync);

    // Distinct created_at stamps keep the newest-first order deterministic.
    let a = sync.create(&draft()).unwrap();
    std::thread::sleep(Duration::from_millis(2));
    let b = sync.create(&draft()).unwrap();
    std::thread::sleep(Duration::from_millis(2));
    let c = sync.create(&draft()).unwrap();
    assert!(wait_until(|| sync.searches().len() == 3));
    let before: Vec<String> = sync.searches().iter().map(|s| s.id.clone()).collect();
    assert_eq!(before, vec![c.id.clone(), b.id.clone(), a.id.clone()]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let lens = Arc::clone(&seen);
    sync.on_change(move |snapshot| lens.lock().unwrap().push(snapshot.len()));

    store.fail_next(StoreOp::DeleteSearch);
    let err = sync.delete(&b.id).unwrap_err();
    assert_eq!(err.as_api().and_then(|api| api.code()), Some("INTERNAL_ERROR"));

    // Restored verbatim, same rows in the same order.
    let after: Vec<String> = sync.searches().iter().map(|s| s.id.clone()).collect();
    assert_eq!(after, before);

    // The cache dipped to two rows and came back before delete returned.
    let dips = seen.lock().unwrap().clone();
    assert_eq!(&dips[..2], &[2, 3]);

    // The trailing refetch agrees with the restore.
    std::thread::sleep(Duration::from_millis(50));
    let final_ids: Vec<String> = sync.searches().iter().map(|s| s.id.clone()).collect();
    assert_eq!(final_ids, before);
    sync.close();
}
