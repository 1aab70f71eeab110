use chrono::{DateTime, Utc};
use grail_sync_macros::TableRecord;
use serde::{Deserialize, Serialize};

use crate::grade::{GradeRange, GradeValue};
use crate::record::{ComicSeries, Platform};

/// A saved grail search: one issue the user is hunting for, with the
/// acceptable grade window, price ceiling, and the platforms to watch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TableRecord)]
#[serde(rename_all = "camelCase")]
#[table_record(table = "user_grail_searches")]
pub struct GrailSearch {
    #[table_record(id)]
    pub id: String,
    pub user_id: String,
    pub series: ComicSeries,
    /// Issue number as printed: digits, or `"nn"` for unnumbered issues.
    pub issue_number: String,
    pub max_price: Option<f64>,
    pub grade_min: GradeValue,
    pub grade_max: GradeValue,
    pub page_quality: Option<String>,
    pub grading_authority: Option<String>,
    pub platforms: Vec<Platform>,
    pub is_active: bool,
    pub notifications_enabled: bool,
    /// Server-computed; absent outside list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_count: Option<u32>,
    pub last_checked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GrailSearch {
    /// The grade window as a single value.
    pub fn grade_range(&self) -> GradeRange {
        GradeRange::new(self.grade_min, self.grade_max)
    }

    /// Card headline: `"Title #N"`.
    pub fn headline(&self) -> String {
        format!("{} #{}", self.series.title, self.issue_number)
    }
}

/// Payload for creating a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDraft {
    pub series_id: i64,
    pub issue_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_min: GradeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_max: GradeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_authority: Option<String>,
    pub platforms: Vec<Platform>,
}

impl SearchDraft {
    pub fn new(series_id: i64, issue_number: impl Into<String>) -> Self {
        SearchDraft {
            series_id,
            issue_number: issue_number.into(),
            max_price: None,
            grade_min: None,
            grade_max: None,
            page_quality: None,
            grading_authority: None,
            platforms: Vec::new(),
        }
    }

    pub fn with_max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn with_grade_range(mut self, range: GradeRange) -> Self {
        self.grade_min = range.min;
        self.grade_max = range.max;
        self
    }

    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    pub fn with_page_quality(mut self, quality: impl Into<String>) -> Self {
        self.page_quality = Some(quality.into());
        self
    }

    pub fn with_grading_authority(mut self, authority: impl Into<String>) -> Self {
        self.grading_authority = Some(authority.into());
        self
    }

    pub fn grade_range(&self) -> GradeRange {
        GradeRange::new(self.grade_min, self.grade_max)
    }
}

/// Partial update for a search.
///
/// Nullable fields use a doubled `Option`: the outer level distinguishes
/// "leave unchanged" (absent) from an explicit `null` that clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_min: Option<GradeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_max: Option<GradeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_quality: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_authority: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SearchPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series_id(mut self, series_id: i64) -> Self {
        self.series_id = Some(series_id);
        self
    }

    pub fn with_issue_number(mut self, issue_number: impl Into<String>) -> Self {
        self.issue_number = Some(issue_number.into());
        self
    }

    /// `Some(price)` sets a ceiling, `None` clears it.
    pub fn with_max_price(mut self, price: Option<f64>) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn with_grade_range(mut self, range: GradeRange) -> Self {
        self.grade_min = Some(range.min);
        self.grade_max = Some(range.max);
        self
    }

    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = Some(platforms.into_iter().collect());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.series_id.is_none()
            && self.issue_number.is_none()
            && self.max_price.is_none()
            && self.grade_min.is_none()
            && self.grade_max.is_none()
            && self.page_quality.is_none()
            && self.grading_authority.is_none()
            && self.platforms.is_none()
            && self.is_active.is_none()
    }
}

/// Dashboard numbers derived from a search list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    pub total: usize,
    pub active: usize,
    /// Summed server-side alert counts.
    pub alerts: u64,
}

impl SearchStats {
    pub fn of(searches: &[GrailSearch]) -> Self {
        SearchStats {
            total: searches.len(),
            active: searches.iter().filter(|s| s.is_active).count(),
            alerts: searches
                .iter()
                .map(|s| u64::from(s.alert_count.unwrap_or(0)))
                .sum(),
        }
    }

    pub fn paused(&self) -> usize {
        self.total - self.active
    }
}
