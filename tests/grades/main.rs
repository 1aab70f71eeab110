//! Grade window behavior as the search form drives it.

use grail_sync::api::{InMemoryStore, SearchStore};
use grail_sync::grade::{grade_value_label, Grade, GradeRange, GRADE_SCALE};
use grail_sync::record::{ComicSeries, Platform, SearchDraft, SearchPatch};

fn grade(value: f64) -> Grade {
    Grade::from_f64(value).unwrap()
}

fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
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

// =============================================================================
// The grade dropdowns
// =============================================================================

#[test]
fn dropdown_options_cover_any_plus_the_scale() {
    // Both bound selectors render "Any" followed by every certified grade.
    let options: Vec<String> = std::iter::once(None)
        .chain(GRADE_SCALE.iter().copied().map(Some))
        .map(grade_value_label)
        .collect();

    assert_eq!(options.len(), 24);
    assert_eq!(options[0], "Any");
    assert_eq!(options[1], "0.5 - Poor");
    assert!(options.contains(&"9.0 - Near Mint".to_string()));
    assert_eq!(options.last().unwrap(), "10.0 - Gem Mint");
}

// =============================================================================
// Editing the window the way the form does
// =============================================================================

#[test]
fn form_edits_keep_the_window_ordered_without_blocking_any() {
    // A user narrows from wide open, then overshoots the minimum.
    let window = GradeRange::any()
        .set_min(Some(grade(9.0)))
        .set_max(Some(grade(9.4)));
    assert_eq!(window, GradeRange::new(Some(grade(9.0)), Some(grade(9.4))));

    let overshot = window.set_min(Some(grade(9.8)));
    assert_eq!(overshot, GradeRange::new(Some(grade(9.8)), Some(grade(9.8))));

    // Backing off to "Any" is never corrected.
    let reopened = overshot.set_min(None);
    assert_eq!(reopened, GradeRange::new(None, Some(grade(9.8))));
    assert!(reopened.is_ordered());
}

#[test]
fn edited_window_round_trips_through_a_saved_search() {
    let store = seeded_store();
    let draft = SearchDraft::new(101, "129")
        .with_platforms([Platform::Ebay])
        .with_grade_range(GradeRange::new(Some(grade(6.0)), Some(grade(9.0))));
    let created = store.create_search("user-1", &draft).unwrap();
    assert_eq!(created.grade_range(), draft.grade_range());

    // Re-edit in the form, then persist the corrected window.
    let window = created.grade_range().set_min(Some(grade(9.4)));
    let updated = store
        .update_search(
            "user-1",
            &created.id,
            &SearchPatch::new().with_grade_range(window),
        )
        .unwrap();
    assert_eq!(updated.grade_min, Some(grade(9.4)));
    assert_eq!(updated.grade_max, Some(grade(9.4)));
}

#[test]
fn store_rejects_windows_the_form_could_not_produce() {
    let store = seeded_store();
    let created = store
        .create_search(
            "user-1",
            &SearchDraft::new(101, "129")
                .with_platforms([Platform::Ebay])
                .with_grade_range(GradeRange::new(None, Some(grade(9.0)))),
        )
        .unwrap();

    // A raw patch can set one bound past the stored opposite bound; the
    // range editor would have corrected it, so the store refuses it.
    let mut patch = SearchPatch::new();
    patch.grade_min = Some(Some(grade(9.8)));
    let err = store.update_search("user-1", &created.id, &patch).unwrap_err();
    assert!(err.is_validation());

    let stored = store.get_search("user-1", &created.id).unwrap();
    assert_eq!(stored.grade_min, None);
    assert_eq!(stored.grade_max, Some(grade(9.0)));
}
