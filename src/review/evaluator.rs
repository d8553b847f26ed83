//! Semantic evaluation capability
//!
//! The judgment of a document against one requirement is opaque to the
//! engine. Anything that can turn `(requirement, text)` into a
//! [`ServiceVerdict`] plugs in here: the LLM-backed evaluator in production,
//! a deterministic fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checklist::ChecklistRequirement;
use crate::llm::LlmError;

/// Unvalidated answer from the evaluation service.
///
/// The status is kept as the raw label; the evaluation unit decides whether
/// it is recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVerdict {
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "justification", alias = "evidence")]
    pub comment: String,
    #[serde(default, alias = "hint", alias = "suggestion", alias = "hint_for_improvement")]
    pub improvement_hint: Option<String>,
}

impl ServiceVerdict {
    /// Create a verdict
    pub fn new(status: impl Into<String>, comment: impl Into<String>, improvement_hint: Option<String>) -> Self {
        Self {
            status: status.into(),
            comment: comment.into(),
            improvement_hint,
        }
    }
}

/// Errors from a single evaluation. Never fatal to a review run.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("evaluation service error: {0}")]
    Llm(#[from] LlmError),

    #[error("evaluation service error: {0}")]
    Service(String),

    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed evaluation response: {0}")]
    Malformed(String),

    #[error("unrecognized status '{0}' (expected Pass, Fail or Not Applicable)")]
    UnknownStatus(String),
}

/// Judges document text against one requirement
#[async_trait]
pub trait SemanticEvaluator: Send + Sync {
    /// Evaluate the (possibly truncated) document text against a requirement
    async fn evaluate(
        &self,
        requirement: &ChecklistRequirement,
        document_text: &str,
    ) -> Result<ServiceVerdict, EvaluationError>;

    /// Get a description of the evaluator
    fn description(&self) -> &str {
        "evaluator"
    }
}
