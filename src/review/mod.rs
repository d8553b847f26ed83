//! Review engine
//!
//! - [`EvaluationUnit`] judges one requirement and never fails
//! - [`ReviewOrchestrator`] runs the unit over a checklist and builds the report
//! - [`SemanticEvaluator`] is the pluggable judgment capability
//! - [`generate_template`] builds a blank assessment skeleton

pub mod evaluator;
pub mod fake;
pub mod llm_evaluator;
pub mod orchestrator;
pub mod prompts;
pub mod response;
pub mod template;
pub mod types;
pub mod unit;

use thiserror::Error;

pub use evaluator::{EvaluationError, SemanticEvaluator, ServiceVerdict};
pub use fake::{FakeBehavior, FakeEvaluator};
pub use llm_evaluator::LlmEvaluator;
pub use orchestrator::{CancelToken, ReviewOrchestrator, ReviewProgress};
pub use template::{TemplateEntry, generate_template};
pub use types::{AssessmentResult, ResultOrigin, ReviewReport, Status};
pub use unit::EvaluationUnit;

/// Preconditions that stop a review before any evaluation
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("checklist has no requirements, nothing to review")]
    EmptyChecklist,

    #[error("document '{source_name}' has no text to review")]
    EmptyDocument { source_name: String },
}
