//! Evaluation unit: one requirement against one document.
//!
//! Wraps a [`SemanticEvaluator`] with everything the engine needs around the
//! call: bounding the document, a per-call timeout, validation of the
//! returned verdict, and degrading any failure into a `Fail` result so a
//! review run always produces one result per requirement.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::evaluator::{EvaluationError, SemanticEvaluator, ServiceVerdict};
use super::types::{AssessmentResult, NOT_APPLICABLE_HINT, Status};
use crate::checklist::ChecklistRequirement;

/// Default document bound, in characters
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 12_000;

/// Appended to a document cut at the bound
pub const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

/// Comment used when a Not Applicable verdict comes without one
pub const MISSING_JUSTIFICATION: &str = "Marked Not Applicable without justification";

/// Evaluates single requirements and never fails
#[derive(Clone)]
pub struct EvaluationUnit {
    evaluator: Arc<dyn SemanticEvaluator>,
    max_document_chars: usize,
    timeout: Option<Duration>,
}

impl EvaluationUnit {
    /// Create a unit with the default document bound and no timeout
    pub fn new(evaluator: Arc<dyn SemanticEvaluator>) -> Self {
        Self {
            evaluator,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
            timeout: None,
        }
    }

    /// Set the document bound in characters
    pub fn with_max_document_chars(mut self, max_chars: usize) -> Self {
        self.max_document_chars = max_chars;
        self
    }

    /// Set the per-evaluation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_document_chars(&self) -> usize {
        self.max_document_chars
    }

    /// Bound the document text, cutting from the end on a char boundary.
    ///
    /// Borrowed when the text already fits.
    pub fn prepare_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match text.char_indices().nth(self.max_document_chars) {
            None => Cow::Borrowed(text),
            Some((cut, _)) => {
                log::warn!(
                    "Document has more than {} characters, truncating {} bytes",
                    self.max_document_chars,
                    text.len() - cut
                );
                let mut bounded = String::with_capacity(cut + TRUNCATION_MARKER.len());
                bounded.push_str(&text[..cut]);
                bounded.push_str(TRUNCATION_MARKER);
                Cow::Owned(bounded)
            }
        }
    }

    /// Evaluate one requirement against the full document text
    pub async fn evaluate(&self, requirement: &ChecklistRequirement, document_text: &str) -> AssessmentResult {
        let prepared = self.prepare_text(document_text);
        self.evaluate_prepared(requirement, &prepared).await
    }

    /// Evaluate one requirement against text already passed through [`prepare_text`](Self::prepare_text)
    pub async fn evaluate_prepared(&self, requirement: &ChecklistRequirement, prepared_text: &str) -> AssessmentResult {
        let start = Instant::now();

        let outcome = self
            .call_service(requirement, prepared_text)
            .await
            .and_then(|verdict| validate_verdict(requirement, verdict));

        match outcome {
            Ok(result) => {
                tracing::debug!(
                    requirement_id = %requirement.id,
                    status = %result.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Requirement evaluated"
                );
                result
            }
            Err(error) => {
                tracing::warn!(
                    requirement_id = %requirement.id,
                    error = %error,
                    "Evaluation failed, recording Fail"
                );
                AssessmentResult::service_error(&requirement.id, error)
            }
        }
    }

    async fn call_service(
        &self,
        requirement: &ChecklistRequirement,
        text: &str,
    ) -> Result<ServiceVerdict, EvaluationError> {
        let call = self.evaluator.evaluate(requirement, text);
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| EvaluationError::Timeout(timeout))?,
            None => call.await,
        }
    }
}

impl std::fmt::Debug for EvaluationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationUnit")
            .field("evaluator", &self.evaluator.description())
            .field("max_document_chars", &self.max_document_chars)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Check a raw verdict and normalize it into a result
pub fn validate_verdict(
    requirement: &ChecklistRequirement,
    verdict: ServiceVerdict,
) -> Result<AssessmentResult, EvaluationError> {
    let status = Status::parse(&verdict.status).ok_or_else(|| EvaluationError::UnknownStatus(verdict.status.clone()))?;
    let comment = verdict.comment.trim();

    match status {
        Status::Pass | Status::Fail if comment.is_empty() => Err(EvaluationError::Malformed(format!(
            "{} verdict without a comment",
            status
        ))),
        Status::NotApplicable if comment.is_empty() => Ok(AssessmentResult::evaluated(
            &requirement.id,
            status,
            MISSING_JUSTIFICATION,
            NOT_APPLICABLE_HINT,
        )),
        Status::Fail => {
            let hint = verdict
                .improvement_hint
                .as_deref()
                .map(str::trim)
                .filter(|h| !h.is_empty() && !h.eq_ignore_ascii_case(NOT_APPLICABLE_HINT))
                .map(str::to_string)
                .unwrap_or_else(|| format!("Add content addressing: {}", requirement.requirement_title));
            Ok(AssessmentResult::evaluated(&requirement.id, status, comment, hint))
        }
        _ => Ok(AssessmentResult::evaluated(
            &requirement.id,
            status,
            comment,
            NOT_APPLICABLE_HINT,
        )),
    }
}
