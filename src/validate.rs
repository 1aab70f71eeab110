//! Draft validation for search creation and updates.
//!
//! Mirrors the server's form rules so callers can reject bad drafts before
//! a round trip. Grade values are already scale-checked by construction;
//! what remains is the issue number format, the platform list, and bound
//! ordering for drafts assembled without the range editor.

use std::error::Error;
use std::fmt;

use crate::record::{SearchDraft, SearchPatch};

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Issue number is empty.
    IssueNumberMissing,
    /// Issue number is neither digits nor "nn".
    IssueNumberFormat(String),
    /// No platform selected.
    NoPlatforms,
    /// Both grade bounds concrete and min > max.
    GradeBoundsInverted,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::IssueNumberMissing => write!(f, "issue number is required"),
            ValidationError::IssueNumberFormat(got) => {
                write!(
                    f,
                    "issue number must be a number (e.g. 1, 129) or \"nn\", got {:?}",
                    got
                )
            }
            ValidationError::NoPlatforms => write!(f, "select at least one platform"),
            ValidationError::GradeBoundsInverted => {
                write!(f, "grade minimum exceeds grade maximum")
            }
        }
    }
}

impl Error for ValidationError {}

/// Digits or the literal `"nn"` (unnumbered issue).
pub fn is_valid_issue_number(value: &str) -> bool {
    value == "nn" || (!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
}

/// Check a creation draft. All failures are collected, not just the first.
pub fn validate_draft(draft: &SearchDraft) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_issue_number(&draft.issue_number, &mut errors);
    if draft.platforms.is_empty() {
        errors.push(ValidationError::NoPlatforms);
    }
    if !draft.grade_range().is_ordered() {
        errors.push(ValidationError::GradeBoundsInverted);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check an update patch. Only the fields the patch carries are checked;
/// bound ordering is checked only when the patch sets both bounds.
pub fn validate_patch(patch: &SearchPatch) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(issue_number) = &patch.issue_number {
        check_issue_number(issue_number, &mut errors);
    }
    if let Some(platforms) = &patch.platforms {
        if platforms.is_empty() {
            errors.push(ValidationError::NoPlatforms);
        }
    }
    if let (Some(Some(min)), Some(Some(max))) = (patch.grade_min, patch.grade_max) {
        if min > max {
            errors.push(ValidationError::GradeBoundsInverted);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_issue_number(value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::IssueNumberMissing);
    } else if !is_valid_issue_number(value) {
        errors.push(ValidationError::IssueNumberFormat(value.to_string()));
    }
}
