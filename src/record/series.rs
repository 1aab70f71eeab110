use serde::{Deserialize, Serialize};

/// A comic series as returned by series search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicSeries {
    pub id: i64,
    pub title: String,
    pub volume: u32,
    /// Publication years as printed, e.g. `"1963-1996"`.
    pub year_range: String,
    /// Empty for the main run, or "Annual", "Giant-Size", "King-Size Special".
    #[serde(rename = "type")]
    pub series_type: String,
    pub publisher: String,
    /// Server-provided display name, when the endpoint includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ComicSeries {
    /// Label shown once a series is selected:
    /// `"Title (Vol. N, YEARS)"`, with the series type appended when set.
    pub fn input_label(&self) -> String {
        let mut label = format!("{} (Vol. {}, {})", self.title, self.volume, self.year_range);
        if !self.series_type.is_empty() {
            label.push(' ');
            label.push_str(&self.series_type);
        }
        label
    }

    /// Dropdown label: `"Title[ Type] (Vol. N, YEARS) - Publisher"`.
    pub fn display_label(&self) -> String {
        let type_part = if self.series_type.is_empty() {
            String::new()
        } else {
            format!(" {}", self.series_type)
        };
        format!(
            "{}{} (Vol. {}, {}) - {}",
            self.title, type_part, self.volume, self.year_range, self.publisher
        )
    }
}
