use std::time::Duration;

use chrono::{DateTime, Utc};
use jobfill_core::{Confidence, FieldType, ProfileFieldPath};
use jobfill_dom::ElementId;
use serde::Serialize;

use crate::FillError;

/// What the detector found for one mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDetectionResult {
    pub element: Option<ElementId>,
    pub matched_selector: Option<String>,
    pub confidence: Confidence,
    pub detected_type: Option<FieldType>,
    pub current_value: Option<String>,
}

impl FieldDetectionResult {
    pub fn not_found() -> Self {
        Self {
            element: None,
            matched_selector: None,
            confidence: Confidence::Low,
            detected_type: None,
            current_value: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.element.is_some()
    }
}

/// Outcome of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFillResult {
    pub path: ProfileFieldPath,
    pub success: bool,
    pub element: Option<ElementId>,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub error: Option<FillError>,
}

impl FieldFillResult {
    pub fn skipped(path: ProfileFieldPath) -> Self {
        Self {
            path,
            success: false,
            element: None,
            previous_value: None,
            new_value: None,
            error: Some(FillError::NoValueInProfile),
        }
    }

    pub fn failed(
        path: ProfileFieldPath,
        element: Option<ElementId>,
        previous_value: Option<String>,
        error: FillError,
    ) -> Self {
        Self {
            path,
            success: false,
            element,
            previous_value,
            new_value: None,
            error: Some(error),
        }
    }

    pub fn filled(path: ProfileFieldPath, element: ElementId, previous_value: Option<String>, new_value: String) -> Self {
        Self {
            path,
            success: true,
            element: Some(element),
            previous_value,
            new_value: Some(new_value),
            error: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.error, Some(FillError::NoValueInProfile))
    }
}

/// Aggregate of one `fill_all_fields` run
#[derive(Debug, Clone, Serialize)]
pub struct FillOperationResult {
    pub platform: String,
    pub total: usize,
    pub filled: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<FieldFillResult>,
    pub elapsed_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl FillOperationResult {
    pub fn from_results(
        platform: impl Into<String>,
        results: Vec<FieldFillResult>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let filled = results.iter().filter(|r| r.success).count();
        let skipped = results.iter().filter(|r| r.is_skipped()).count();
        let failed = results.len() - filled - skipped;

        Self {
            platform: platform.into(),
            total: results.len(),
            filled,
            skipped,
            failed,
            results,
            elapsed_ms: elapsed.as_millis() as u64,
            started_at,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FieldFillResult> {
        self.results.iter().filter(|r| !r.success && !r.is_skipped())
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} filled, {} skipped, {} failed of {} fields in {}ms",
            self.platform, self.filled, self.skipped, self.failed, self.total, self.elapsed_ms
        )
    }
}

/// One line of a dry run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewEntry {
    pub path: ProfileFieldPath,
    pub found: bool,
    /// Value that would be written, transform applied
    pub value: Option<String>,
    pub element: Option<ElementId>,
    pub confidence: Confidence,
}
