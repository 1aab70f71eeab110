//! In-memory stores for testing and single-process scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{AlertQuery, AlertStore, ApiError, Page, SearchStore, SeriesStore};
use crate::feed::{ChangeEvent, ChangeOp, InMemoryFeed};
use crate::record::{Alert, ComicSeries, GrailSearch, SearchDraft, SearchPatch, TableRecord};
use crate::validate::{validate_draft, validate_patch, ValidationError};

/// A store operation, for targeting failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    ListSearches,
    GetSearch,
    CreateSearch,
    UpdateSearch,
    SetSearchActive,
    DeleteSearch,
    ListAlerts,
    SearchSeries,
}

#[derive(Default)]
struct Faults {
    fail: Option<(StoreOp, ApiError)>,
    stall: Option<(StoreOp, Duration)>,
}

/// In-memory store over all three seams.
///
/// Features:
/// - Thread-safe (shared across threads via `Clone`)
/// - Rows scoped per user, like the hosted API's row-level security
/// - Publishes scoped [`ChangeEvent`]s on every mutation when a feed is
///   attached
/// - Failure and stall injection for exercising degraded paths
#[derive(Clone, Default)]
pub struct InMemoryStore {
    series: Arc<RwLock<Vec<ComicSeries>>>,
    searches: Arc<RwLock<Vec<GrailSearch>>>,
    alerts: Arc<RwLock<HashMap<String, Vec<Alert>>>>,
    feed: Option<InMemoryFeed>,
    faults: Arc<Mutex<Faults>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a feed; every later mutation publishes a scoped change
    /// event to it.
    pub fn with_feed(mut self, feed: InMemoryFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Load series into the catalog.
    pub fn seed_series(&self, series: impl IntoIterator<Item = ComicSeries>) {
        self.series.write().unwrap().extend(series);
    }

    /// Insert a search as-is: no validation, no timestamps, no events.
    pub fn seed_search(&self, search: GrailSearch) {
        self.searches.write().unwrap().push(search);
    }

    /// The scanner's write path: store a new alert and publish its
    /// insert event.
    pub fn record_alert(&self, user_id: &str, alert: Alert) {
        self.alerts
            .write()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(alert.clone());
        self.publish(ChangeOp::Insert, user_id, &alert);
    }

    /// Make the next call for the given operation fail with a 500.
    pub fn fail_next(&self, op: StoreOp) {
        self.fail_next_with(op, ApiError::status(500, "INTERNAL_ERROR", "injected failure"));
    }

    /// Make the next call for the given operation fail with a specific
    /// error.
    pub fn fail_next_with(&self, op: StoreOp, error: ApiError) {
        self.faults.lock().unwrap().fail = Some((op, error));
    }

    /// Delay the next call for the given operation, to widen in-flight
    /// windows in tests.
    pub fn stall_next(&self, op: StoreOp, delay: Duration) {
        self.faults.lock().unwrap().stall = Some((op, delay));
    }

    fn gate(&self, op: StoreOp) -> Result<(), ApiError> {
        let stall = {
            let mut faults = self.faults.lock().unwrap();
            match faults.stall {
                Some((stalled_op, delay)) if stalled_op == op => {
                    faults.stall = None;
                    Some(delay)
                }
                _ => None,
            }
        };
        if let Some(delay) = stall {
            std::thread::sleep(delay);
        }

        let mut faults = self.faults.lock().unwrap();
        match &faults.fail {
            Some((failed_op, _)) if *failed_op == op => {
                let (_, error) = faults.fail.take().unwrap();
                Err(error)
            }
            _ => Ok(()),
        }
    }

    fn publish(&self, op: ChangeOp, user_id: &str, record: &impl TableRecord) {
        if let Some(feed) = &self.feed {
            match ChangeEvent::for_record(op, record) {
                Ok(event) => feed.publish(event.with_user(user_id)),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping change event for unencodable record");
                }
            }
        }
    }

    fn find_series(&self, series_id: i64) -> Result<ComicSeries, ApiError> {
        self.series
            .read()
            .unwrap()
            .iter()
            .find(|series| series.id == series_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "SERIES_NOT_FOUND", "Series not found"))
    }

    /// Patch semantics: absent fields stay, `null` fields clear.
    fn patched(&self, search: &GrailSearch, patch: &SearchPatch) -> Result<GrailSearch, ApiError> {
        let mut updated = search.clone();
        if let Some(series_id) = patch.series_id {
            updated.series = self.find_series(series_id)?;
        }
        if let Some(issue_number) = &patch.issue_number {
            updated.issue_number = issue_number.clone();
        }
        if let Some(max_price) = patch.max_price {
            updated.max_price = max_price;
        }
        if let Some(grade_min) = patch.grade_min {
            updated.grade_min = grade_min;
        }
        if let Some(grade_max) = patch.grade_max {
            updated.grade_max = grade_max;
        }
        if let Some(page_quality) = &patch.page_quality {
            updated.page_quality = page_quality.clone();
        }
        if let Some(grading_authority) = &patch.grading_authority {
            updated.grading_authority = grading_authority.clone();
        }
        if let Some(platforms) = &patch.platforms {
            updated.platforms = platforms.clone();
        }
        if let Some(is_active) = patch.is_active {
            updated.is_active = is_active;
        }

        if !updated.grade_range().is_ordered() {
            return Err(ApiError::status(
                422,
                "VALIDATION_ERROR",
                "grade_min must not exceed grade_max",
            ));
        }
        updated.updated_at = Utc::now();
        Ok(updated)
    }
}

fn validation_error(errors: Vec<ValidationError>) -> ApiError {
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    ApiError::status(422, "VALIDATION_ERROR", messages.join("; ")).with_details(json!(messages))
}

impl SearchStore for InMemoryStore {
    fn list_searches(&self, user_id: &str) -> Result<Vec<GrailSearch>, ApiError> {
        self.gate(StoreOp::ListSearches)?;
        let mut rows: Vec<GrailSearch> = self
            .searches
            .read()
            .unwrap()
            .iter()
            .filter(|search| search.user_id == user_id)
            .cloned()
            .collect();

        // The hosted API derives alertCount per response, so an alert
        // insert is visible through a plain search refetch.
        let alerts = self.alerts.read().unwrap();
        let user_alerts = alerts.get(user_id);
        for row in &mut rows {
            let count = user_alerts
                .map(|alerts| alerts.iter().filter(|alert| alert.search_id == row.id).count())
                .unwrap_or(0);
            row.alert_count = Some(count as u32);
        }
        drop(alerts);

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn get_search(&self, user_id: &str, id: &str) -> Result<GrailSearch, ApiError> {
        self.gate(StoreOp::GetSearch)?;
        self.searches
            .read()
            .unwrap()
            .iter()
            .find(|search| search.user_id == user_id && search.id == id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "SEARCH_NOT_FOUND", "Search not found"))
    }

    fn create_search(&self, user_id: &str, draft: &SearchDraft) -> Result<GrailSearch, ApiError> {
        self.gate(StoreOp::CreateSearch)?;
        validate_draft(draft).map_err(validation_error)?;
        let series = self.find_series(draft.series_id)?;

        let now = Utc::now();
        let search = GrailSearch {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            series,
            issue_number: draft.issue_number.clone(),
            max_price: draft.max_price,
            grade_min: draft.grade_min,
            grade_max: draft.grade_max,
            page_quality: draft.page_quality.clone(),
            grading_authority: draft.grading_authority.clone(),
            platforms: draft.platforms.clone(),
            is_active: true,
            notifications_enabled: true,
            alert_count: Some(0),
            last_checked_at: now,
            created_at: now,
            updated_at: now,
        };

        self.searches.write().unwrap().push(search.clone());
        self.publish(ChangeOp::Insert, user_id, &search);
        Ok(search)
    }

    fn update_search(
        &self,
        user_id: &str,
        id: &str,
        patch: &SearchPatch,
    ) -> Result<GrailSearch, ApiError> {
        self.gate(StoreOp::UpdateSearch)?;
        validate_patch(patch).map_err(validation_error)?;

        let current = self.get_search(user_id, id)?;
        let updated = self.patched(&current, patch)?;

        let mut searches = self.searches.write().unwrap();
        if let Some(row) = searches.iter_mut().find(|search| search.id == id) {
            *row = updated.clone();
        }
        drop(searches);

        self.publish(ChangeOp::Update, user_id, &updated);
        Ok(updated)
    }

    fn set_search_active(
        &self,
        user_id: &str,
        id: &str,
        active: bool,
    ) -> Result<GrailSearch, ApiError> {
        self.gate(StoreOp::SetSearchActive)?;
        let mut updated = self.get_search(user_id, id)?;
        updated.is_active = active;
        updated.updated_at = Utc::now();

        let mut searches = self.searches.write().unwrap();
        if let Some(row) = searches.iter_mut().find(|search| search.id == id) {
            *row = updated.clone();
        }
        drop(searches);

        self.publish(ChangeOp::Update, user_id, &updated);
        Ok(updated)
    }

    fn delete_search(&self, user_id: &str, id: &str) -> Result<(), ApiError> {
        self.gate(StoreOp::DeleteSearch)?;
        let removed = {
            let mut searches = self.searches.write().unwrap();
            let position = searches
                .iter()
                .position(|search| search.user_id == user_id && search.id == id)
                .ok_or_else(|| ApiError::status(404, "SEARCH_NOT_FOUND", "Search not found"))?;
            searches.remove(position)
        };
        self.publish(ChangeOp::Delete, user_id, &removed);
        Ok(())
    }
}

impl AlertStore for InMemoryStore {
    fn list_alerts(&self, user_id: &str, query: &AlertQuery) -> Result<Page<Alert>, ApiError> {
        self.gate(StoreOp::ListAlerts)?;
        let mut rows: Vec<Alert> = self
            .alerts
            .read()
            .unwrap()
            .get(user_id)
            .map(|alerts| alerts.clone())
            .unwrap_or_default();
        rows.retain(|alert| query.matches(alert));
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = rows.len() as u64;
        Ok(Page::new(query.page.apply(&rows), total))
    }
}

impl SeriesStore for InMemoryStore {
    fn search_series(&self, query: &str) -> Result<Vec<ComicSeries>, ApiError> {
        self.gate(StoreOp::SearchSeries)?;
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < 2 {
            return Ok(Vec::new());
        }

        let mut matches: Vec<ComicSeries> = self
            .series
            .read()
            .unwrap()
            .iter()
            .filter(|series| series.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.title.cmp(&b.title).then(a.volume.cmp(&b.volume)));
        Ok(matches)
    }
}
