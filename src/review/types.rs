//! Assessment results and the aggregate review report

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, SourceFormat};

/// Hint carried by every result that is not a failure
pub const NOT_APPLICABLE_HINT: &str = "N/A";

/// Hint carried by results whose evaluation could not be completed
pub const SERVICE_ERROR_HINT: &str = "Re-run review; evaluation service error";

/// Comment carried by requirements skipped because the run was cancelled
pub const CANCELLED_COMMENT: &str =
    "Not evaluated: review run was cancelled before this requirement was assessed";

/// Verdict for one requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pass,
    Fail,
    NotApplicable,
}

impl Status {
    /// Parse a status label case-insensitively.
    ///
    /// `Not Applicable`, `not_applicable`, `not-applicable` and
    /// `NotApplicable` are all accepted.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "notapplicable" => Some(Self::NotApplicable),
            _ => None,
        }
    }

    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::NotApplicable => "Not Applicable",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a result came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    /// The evaluation service produced a valid verdict
    #[default]
    Evaluated,
    /// The evaluation failed and the result was degraded to Fail
    ServiceError,
    /// The run was cancelled before this requirement was evaluated
    Cancelled,
}

/// Outcome of evaluating one requirement against the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub requirement_id: String,
    pub status: Status,
    pub comment: String,
    pub improvement_hint: String,
    #[serde(default)]
    pub origin: ResultOrigin,
}

impl AssessmentResult {
    /// Result backed by a validated verdict.
    ///
    /// Non-failing results always carry the `N/A` hint.
    pub fn evaluated(
        requirement_id: impl Into<String>,
        status: Status,
        comment: impl Into<String>,
        improvement_hint: impl Into<String>,
    ) -> Self {
        let improvement_hint = match status {
            Status::Fail => improvement_hint.into(),
            _ => NOT_APPLICABLE_HINT.to_string(),
        };
        Self {
            requirement_id: requirement_id.into(),
            status,
            comment: comment.into(),
            improvement_hint,
            origin: ResultOrigin::Evaluated,
        }
    }

    /// Sentinel for an evaluation that could not be completed
    pub fn service_error(requirement_id: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            requirement_id: requirement_id.into(),
            status: Status::Fail,
            comment: format!("Evaluation could not be completed: {}", cause),
            improvement_hint: SERVICE_ERROR_HINT.to_string(),
            origin: ResultOrigin::ServiceError,
        }
    }

    /// Sentinel for a requirement skipped by cancellation
    pub fn cancelled(requirement_id: impl Into<String>) -> Self {
        Self {
            requirement_id: requirement_id.into(),
            status: Status::NotApplicable,
            comment: CANCELLED_COMMENT.to_string(),
            improvement_hint: NOT_APPLICABLE_HINT.to_string(),
            origin: ResultOrigin::Cancelled,
        }
    }

    /// Whether the evaluation service produced this result
    pub fn is_evaluated(&self) -> bool {
        self.origin == ResultOrigin::Evaluated
    }
}

/// Aggregate result of one review run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    /// One result per requirement, in checklist order
    pub results: Vec<AssessmentResult>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_applicable: usize,
    pub compliance_percentage: f64,
    /// Set when the run stopped early; unevaluated items are marked, not omitted
    pub cancelled: bool,
    pub document_name: String,
    pub source_format: SourceFormat,
    pub generated_at: DateTime<Utc>,
}

impl ReviewReport {
    /// Build the report and derive its counts from the results
    pub fn new(results: Vec<AssessmentResult>, document: &Document, cancelled: bool) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.status == Status::Pass).count();
        let failed = results.iter().filter(|r| r.status == Status::Fail).count();
        let not_applicable = results.iter().filter(|r| r.status == Status::NotApplicable).count();

        Self {
            compliance_percentage: compliance_percentage(passed, total, not_applicable),
            results,
            total,
            passed,
            failed,
            not_applicable,
            cancelled,
            document_name: document.source_name.clone(),
            source_format: document.source_format,
            generated_at: Utc::now(),
        }
    }

    /// Percentage rounded to the nearest integer, as shown in reports
    pub fn compliance_rounded(&self) -> u32 {
        self.compliance_percentage.round() as u32
    }

    /// Look up the result for a requirement
    pub fn result_for(&self, requirement_id: &str) -> Option<&AssessmentResult> {
        self.results.iter().find(|r| r.requirement_id == requirement_id)
    }

    /// Results that failed, in checklist order
    pub fn failures(&self) -> impl Iterator<Item = &AssessmentResult> {
        self.results.iter().filter(|r| r.status == Status::Fail)
    }

    /// Number of results degraded because evaluation could not be completed
    pub fn service_errors(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.origin == ResultOrigin::ServiceError)
            .count()
    }
}

/// Share of applicable requirements that passed, 0 when none apply
pub fn compliance_percentage(passed: usize, total: usize, not_applicable: usize) -> f64 {
    let applicable = total.saturating_sub(not_applicable);
    if applicable == 0 {
        0.0
    } else {
        passed as f64 / applicable as f64 * 100.0
    }
}
