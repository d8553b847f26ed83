//! Deterministic evaluator for tests and offline runs

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::evaluator::{EvaluationError, SemanticEvaluator, ServiceVerdict};
use crate::checklist::ChecklistRequirement;

/// Canned answer for one requirement
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Verdict(ServiceVerdict),
    Error(String),
}

/// What the fake answers
#[derive(Debug, Clone)]
pub enum FakeBehavior {
    AlwaysPass,
    AlwaysFail,
    AlwaysError,
    /// Per-requirement answers; unknown ids are service errors
    Scripted(HashMap<String, FakeResponse>),
}

/// Evaluator with fixed answers that counts its calls
#[derive(Debug)]
pub struct FakeEvaluator {
    behavior: FakeBehavior,
    delay: Option<Duration>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeEvaluator {
    /// Create a fake with the given behavior
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn always_pass() -> Self {
        Self::new(FakeBehavior::AlwaysPass)
    }

    pub fn always_fail() -> Self {
        Self::new(FakeBehavior::AlwaysFail)
    }

    pub fn always_error() -> Self {
        Self::new(FakeBehavior::AlwaysError)
    }

    /// Start an empty script; add answers with the builder methods
    pub fn scripted() -> Self {
        Self::new(FakeBehavior::Scripted(HashMap::new()))
    }

    /// Script a Pass for `id`
    pub fn pass(self, id: &str) -> Self {
        let verdict = ServiceVerdict::new("Pass", format!("Evidence for {} found in the document", id), None);
        self.respond(id, FakeResponse::Verdict(verdict))
    }

    /// Script a Fail with a hint for `id`
    pub fn fail(self, id: &str, hint: &str) -> Self {
        let verdict = ServiceVerdict::new(
            "Fail",
            format!("No evidence for {} in the document", id),
            Some(hint.to_string()),
        );
        self.respond(id, FakeResponse::Verdict(verdict))
    }

    /// Script a Not Applicable for `id`
    pub fn not_applicable(self, id: &str) -> Self {
        let verdict = ServiceVerdict::new("Not Applicable", format!("{} does not apply to this item", id), None);
        self.respond(id, FakeResponse::Verdict(verdict))
    }

    /// Script a service error for `id`
    pub fn error(self, id: &str, message: &str) -> Self {
        self.respond(id, FakeResponse::Error(message.to_string()))
    }

    /// Script an arbitrary raw verdict for `id`
    pub fn verdict(self, id: &str, verdict: ServiceVerdict) -> Self {
        self.respond(id, FakeResponse::Verdict(verdict))
    }

    /// Sleep before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before answering `id`, overriding the global delay
    pub fn with_delay_for(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Number of evaluate calls started
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requirement ids in the order their evaluations completed
    pub fn completed(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn respond(mut self, id: &str, response: FakeResponse) -> Self {
        if let FakeBehavior::Scripted(script) = &mut self.behavior {
            script.insert(id.to_string(), response);
        }
        self
    }

    fn answer(&self, requirement: &ChecklistRequirement) -> FakeResponse {
        match &self.behavior {
            FakeBehavior::AlwaysPass => FakeResponse::Verdict(ServiceVerdict::new(
                "Pass",
                format!("The document addresses '{}'", requirement.requirement_title),
                None,
            )),
            FakeBehavior::AlwaysFail => FakeResponse::Verdict(ServiceVerdict::new(
                "Fail",
                format!("The document does not address '{}'", requirement.requirement_title),
                Some(format!("Describe: {}", requirement.description)),
            )),
            FakeBehavior::AlwaysError => FakeResponse::Error("evaluation service unavailable".to_string()),
            FakeBehavior::Scripted(script) => script
                .get(&requirement.id)
                .cloned()
                .unwrap_or_else(|| FakeResponse::Error(format!("no scripted verdict for {}", requirement.id))),
        }
    }
}

#[async_trait]
impl SemanticEvaluator for FakeEvaluator {
    async fn evaluate(
        &self,
        requirement: &ChecklistRequirement,
        _document_text: &str,
    ) -> Result<ServiceVerdict, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&requirement.id).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        if let Ok(mut seen) = self.seen.lock() {
            seen.push(requirement.id.clone());
        }

        match self.answer(requirement) {
            FakeResponse::Verdict(verdict) => Ok(verdict),
            FakeResponse::Error(message) => Err(EvaluationError::Service(message)),
        }
    }

    fn description(&self) -> &str {
        "fake evaluator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: &str) -> ChecklistRequirement {
        ChecklistRequirement::new(id, "Cat", "Title", "Description", "Ref")
    }

    #[tokio::test]
    async fn test_always_variants() {
        let pass = FakeEvaluator::always_pass();
        assert_eq!(pass.evaluate(&req("A"), "doc").await.unwrap().status, "Pass");

        let fail = FakeEvaluator::always_fail();
        let verdict = fail.evaluate(&req("A"), "doc").await.unwrap();
        assert_eq!(verdict.status, "Fail");
        assert!(verdict.improvement_hint.is_some());

        let error = FakeEvaluator::always_error();
        assert!(error.evaluate(&req("A"), "doc").await.is_err());
    }

    #[tokio::test]
    async fn test_scripted() {
        let fake = FakeEvaluator::scripted()
            .pass("A")
            .fail("B", "add temperature range")
            .error("C", "boom");

        assert_eq!(fake.evaluate(&req("A"), "d").await.unwrap().status, "Pass");
        let b = fake.evaluate(&req("B"), "d").await.unwrap();
        assert_eq!(b.improvement_hint.as_deref(), Some("add temperature range"));
        assert!(matches!(
            fake.evaluate(&req("C"), "d").await,
            Err(EvaluationError::Service(ref m)) if m == "boom"
        ));
        assert!(fake.evaluate(&req("Z"), "d").await.is_err());
        assert_eq!(fake.call_count(), 4);
        assert_eq!(fake.completed(), vec!["A", "B", "C", "Z"]);
    }
}
