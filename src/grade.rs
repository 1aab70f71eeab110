//! Grade values and grade ranges on the comic grading scale.
//!
//! Grades live on a fixed 23-point scale from 0.5 to 10.0. A [`Grade`] stores
//! tenths as an integer, so comparisons are exact and no float equality is
//! involved. "Any" (no bound) is represented as `None`; [`GradeValue`] is the
//! alias for `Option<Grade>`.
//!
//! [`GradeRange`] keeps the `min <= max` ordering consistent under
//! independent single-bound edits. An edit that would invert the interval
//! collapses it to a single point at the edited value instead; an "Any" bound
//! on either side is exempt, so "at least X" and "at most Y" stay
//! expressible.
//!
//! ## Example
//!
//! ```
//! use grail_sync::{Grade, GradeRange};
//!
//! let range = GradeRange::new(Grade::from_f64(9.0), Grade::from_f64(9.4));
//!
//! // Raising the minimum past the maximum drags the maximum along.
//! let range = range.set_min(Grade::from_f64(9.8));
//! assert_eq!(range.min, Grade::from_f64(9.8));
//! assert_eq!(range.max, Grade::from_f64(9.8));
//!
//! // An "Any" bound is never auto-corrected.
//! let open = range.set_max(None);
//! assert_eq!(open.max, None);
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A condition grade on the fixed comic grading scale.
///
/// Stored as tenths (`9.8` is `98`), so ordering and equality are exact.
/// Construct via [`Grade::from_f64`] or [`Grade::from_tenths`]; both reject
/// values that are not scale points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(u16);

/// An optional grade bound. `None` means "Any" (unbounded).
pub type GradeValue = Option<Grade>;

/// All grades on the scale, ascending. Half-point steps from 0.5 to 9.0,
/// then the 9.2 / 9.4 / 9.6 / 9.8 / 10.0 top end.
pub const GRADE_SCALE: [Grade; 23] = [
    Grade(5),
    Grade(10),
    Grade(15),
    Grade(20),
    Grade(25),
    Grade(30),
    Grade(35),
    Grade(40),
    Grade(45),
    Grade(50),
    Grade(55),
    Grade(60),
    Grade(65),
    Grade(70),
    Grade(75),
    Grade(80),
    Grade(85),
    Grade(90),
    Grade(92),
    Grade(94),
    Grade(96),
    Grade(98),
    Grade(100),
];

impl Grade {
    /// Parse a grade from its numeric value (e.g. `9.8`).
    ///
    /// Returns `None` for anything that is not a scale point.
    pub fn from_f64(value: f64) -> Option<Grade> {
        let scaled = value * 10.0;
        let tenths = scaled.round();
        if (scaled - tenths).abs() > 1e-6 {
            return None;
        }
        if tenths < 0.0 || tenths > u16::MAX as f64 {
            return None;
        }
        Self::from_tenths(tenths as u16)
    }

    /// Parse a grade from tenths (`98` is grade 9.8).
    pub fn from_tenths(tenths: u16) -> Option<Grade> {
        let on_scale = match tenths {
            5..=90 => tenths % 5 == 0,
            92 | 94 | 96 | 98 | 100 => true,
            _ => false,
        };
        on_scale.then_some(Grade(tenths))
    }

    /// The grade in tenths.
    pub const fn tenths(&self) -> u16 {
        self.0
    }

    /// The grade as its numeric value.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// The conventional name for named scale points (`9.0` is "Near Mint").
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            5 => Some("Poor"),
            10 => Some("Fair"),
            20 => Some("Good"),
            40 => Some("Very Good"),
            60 => Some("Fine"),
            80 => Some("Very Fine"),
            90 => Some("Near Mint"),
            100 => Some("Gem Mint"),
            _ => None,
        }
    }

    /// Selector label: `"9.0 - Near Mint"` for named points, `"9.8"` otherwise.
    pub fn label(&self) -> String {
        match self.name() {
            Some(name) => format!("{} - {}", self, name),
            None => self.to_string(),
        }
    }

    /// The full scale, ascending.
    pub fn scale() -> &'static [Grade] {
        &GRADE_SCALE
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Grade::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{} is not a grade on the scale", value)))
    }
}

/// Selector label for an optional bound: `"Any"` when unbounded.
pub fn grade_value_label(value: GradeValue) -> String {
    match value {
        Some(grade) => grade.label(),
        None => "Any".to_string(),
    }
}

/// A `[min, max]` grade interval with independently editable bounds.
///
/// Invariant: when both bounds are concrete, `min <= max` after every edit.
/// No ordering is enforced against an "Any" bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradeRange {
    pub min: GradeValue,
    pub max: GradeValue,
}

impl GradeRange {
    pub const fn new(min: GradeValue, max: GradeValue) -> Self {
        GradeRange { min, max }
    }

    /// The unbounded range: any grade matches.
    pub const fn any() -> Self {
        GradeRange {
            min: None,
            max: None,
        }
    }

    /// Replace the minimum bound.
    ///
    /// If the new minimum and the current maximum are both concrete and the
    /// new minimum is greater, the maximum is raised to match. In every other
    /// case the maximum is untouched.
    #[must_use]
    pub fn set_min(self, new_min: GradeValue) -> GradeRange {
        let mut max = self.max;
        if let (Some(min), Some(cur_max)) = (new_min, self.max) {
            if min > cur_max {
                max = Some(min);
            }
        }
        GradeRange { min: new_min, max }
    }

    /// Replace the maximum bound.
    ///
    /// Symmetric to [`set_min`](Self::set_min): a concrete new maximum below
    /// a concrete current minimum lowers the minimum to match.
    #[must_use]
    pub fn set_max(self, new_max: GradeValue) -> GradeRange {
        let mut min = self.min;
        if let (Some(max), Some(cur_min)) = (new_max, self.min) {
            if max < cur_min {
                min = Some(max);
            }
        }
        GradeRange { min, max: new_max }
    }

    /// Whether a grade falls inside the range. An "Any" bound matches all.
    pub fn contains(&self, grade: Grade) -> bool {
        self.min.map_or(true, |min| grade >= min) && self.max.map_or(true, |max| grade <= max)
    }

    /// True unless both bounds are concrete and inverted.
    ///
    /// Ranges produced by `set_min` / `set_max` always satisfy this; the
    /// check exists for ranges deserialized from external payloads.
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}
