//! Review orchestrator: runs the evaluation unit over a whole checklist.
//!
//! Evaluations are index-tagged futures polled through a bounded
//! `FuturesUnordered`; each completion lands in the slot for its checklist
//! position, so the report order never depends on completion order.
//! Cancellation and the run deadline stop issuing work, drop whatever is in
//! flight, and mark every empty slot as not evaluated.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;

use super::ReviewError;
use super::types::{AssessmentResult, ReviewReport, Status};
use super::unit::EvaluationUnit;
use crate::checklist::Checklist;
use crate::document::Document;

/// Shared cancellation handle for a review run.
///
/// Clones observe the same flag; cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been requested
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress notification sent after each completed evaluation
#[derive(Debug, Clone)]
pub struct ReviewProgress {
    pub completed: usize,
    pub total: usize,
    pub requirement_id: String,
    pub status: Status,
}

/// Callback invoked with progress updates
pub type ProgressCallback = Arc<dyn Fn(&ReviewProgress) + Send + Sync>;

/// Runs a review of one document against one checklist
#[derive(Clone)]
pub struct ReviewOrchestrator {
    unit: EvaluationUnit,
    concurrency: usize,
    run_timeout: Option<Duration>,
    progress: Option<ProgressCallback>,
}

impl ReviewOrchestrator {
    /// Create a sequential orchestrator without a run deadline
    pub fn new(unit: EvaluationUnit) -> Self {
        Self {
            unit,
            concurrency: 1,
            run_timeout: None,
            progress: None,
        }
    }

    /// Bound the number of evaluations in flight (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stop the run after `timeout`, keeping completed results
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Report each completed evaluation
    pub fn with_progress(mut self, callback: impl Fn(&ReviewProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Review the document against every requirement
    pub async fn run_review(&self, checklist: &Checklist, document: &Document) -> Result<ReviewReport, ReviewError> {
        self.run_review_with_cancel(checklist, document, &CancelToken::new())
            .await
    }

    /// Review the document, stopping early when `cancel` fires.
    ///
    /// A cancelled run is not an error: the report has one result per
    /// requirement and `cancelled` set.
    pub async fn run_review_with_cancel(
        &self,
        checklist: &Checklist,
        document: &Document,
        cancel: &CancelToken,
    ) -> Result<ReviewReport, ReviewError> {
        if checklist.is_empty() {
            return Err(ReviewError::EmptyChecklist);
        }
        if document.is_blank() {
            return Err(ReviewError::EmptyDocument {
                source_name: document.source_name.clone(),
            });
        }

        let requirements = checklist.requirements();
        let total = requirements.len();
        let start = Instant::now();

        tracing::info!(
            document = %document.source_name,
            requirements = total,
            concurrency = self.concurrency,
            "Starting review"
        );

        let prepared = self.unit.prepare_text(&document.text);
        let text: &str = &prepared;

        let mut slots: Vec<Option<AssessmentResult>> = vec![None; total];
        let mut pending = requirements.iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut completed = 0usize;
        let mut cancelled = false;

        let run_timeout = self.run_timeout;
        let deadline = async move {
            match run_timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            while in_flight.len() < self.concurrency {
                let Some((index, requirement)) = pending.next() else {
                    break;
                };
                let unit = &self.unit;
                in_flight.push(async move { (index, unit.evaluate_prepared(requirement, text).await) });
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::warn!("Review cancelled with {} of {} requirements evaluated", completed, total);
                    cancelled = true;
                    break;
                }
                _ = &mut deadline => {
                    log::warn!(
                        "Review deadline of {:?} reached with {} of {} requirements evaluated",
                        run_timeout.unwrap_or_default(),
                        completed,
                        total
                    );
                    cancelled = true;
                    break;
                }
                Some((index, result)) = in_flight.next() => {
                    completed += 1;
                    if let Some(callback) = &self.progress {
                        callback(&ReviewProgress {
                            completed,
                            total,
                            requirement_id: result.requirement_id.clone(),
                            status: result.status,
                        });
                    }
                    slots[index] = Some(result);
                }
                else => break,
            }
        }

        // in-flight evaluations are abandoned, not awaited
        drop(in_flight);

        let results: Vec<AssessmentResult> = slots
            .into_iter()
            .zip(requirements)
            .map(|(slot, requirement)| slot.unwrap_or_else(|| AssessmentResult::cancelled(&requirement.id)))
            .collect();

        let report = ReviewReport::new(results, document, cancelled);

        tracing::info!(
            document = %report.document_name,
            passed = report.passed,
            failed = report.failed,
            not_applicable = report.not_applicable,
            compliance = report.compliance_rounded(),
            cancelled = report.cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Review finished"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for ReviewOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewOrchestrator")
            .field("unit", &self.unit)
            .field("concurrency", &self.concurrency)
            .field("run_timeout", &self.run_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::checklist::ChecklistRequirement;
    use crate::review::fake::FakeEvaluator;
    use crate::review::types::ResultOrigin;

    fn checklist(ids: &[&str]) -> Checklist {
        Checklist::new(
            ids.iter()
                .map(|id| ChecklistRequirement::new(*id, "General", format!("Title {}", id), "Desc", "N/A"))
                .collect(),
        )
        .unwrap()
    }

    fn orchestrator(fake: FakeEvaluator) -> (ReviewOrchestrator, Arc<FakeEvaluator>) {
        let fake = Arc::new(fake);
        let unit = EvaluationUnit::new(fake.clone());
        (ReviewOrchestrator::new(unit), fake)
    }

    fn doc() -> Document {
        Document::from_text("item.txt", "The item is an electric power steering ECU.")
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_review_all_pass() {
        let (orch, fake) = orchestrator(FakeEvaluator::always_pass());
        let report = orch.run_review(&checklist(&["A", "B"]), &doc()).await.unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 2);
        assert_eq!(report.compliance_rounded(), 100);
        assert!(!report.cancelled);
        assert_eq!(fake.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_checklist_rejected() {
        let (orch, fake) = orchestrator(FakeEvaluator::always_pass());
        let err = orch.run_review(&Checklist::default(), &doc()).await.unwrap_err();
        assert!(matches!(err, ReviewError::EmptyChecklist));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_document_rejected() {
        let (orch, fake) = orchestrator(FakeEvaluator::always_pass());
        let err = orch
            .run_review(&checklist(&["A", "B"]), &Document::from_text("empty.txt", "  \n\t"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::EmptyDocument { .. }));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_order_preserved_under_concurrency() {
        let fake = FakeEvaluator::always_pass()
            .with_delay_for("A", Duration::from_millis(60))
            .with_delay_for("B", Duration::from_millis(30))
            .with_delay_for("C", Duration::from_millis(1));
        let (orch, fake) = orchestrator(fake);
        let orch = orch.with_concurrency(3);

        let report = orch.run_review(&checklist(&["A", "B", "C"]), &doc()).await.unwrap();
        let ids: Vec<_> = report.results.iter().map(|r| r.requirement_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(fake.completed(), vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_run_timeout_marks_remaining() {
        let fake = FakeEvaluator::always_pass().with_delay(Duration::from_millis(40));
        let (orch, _fake) = orchestrator(fake);
        let orch = orch.with_run_timeout(Duration::from_millis(60));

        let report = orch.run_review(&checklist(&["A", "B", "C", "D"]), &doc()).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.results[0].status, Status::Pass);
        assert_eq!(report.results[3].origin, ResultOrigin::Cancelled);
        assert_eq!(report.total, report.passed + report.failed + report.not_applicable);
    }

    #[tokio::test]
    async fn test_cancel_drops_in_flight_evaluations() {
        let fake = FakeEvaluator::always_pass()
            .with_delay(Duration::from_millis(300))
            .with_delay_for("A", Duration::from_millis(10));
        let (orch, fake) = orchestrator(fake);
        let orch = orch.with_concurrency(3);
        let token = CancelToken::new();

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            trigger.cancel();
        });

        let ids = ["A", "B", "C", "D", "E"];
        let report = orch
            .run_review_with_cancel(&checklist(&ids), &doc(), &token)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.results.len(), ids.len());
        assert_eq!(report.results[0].origin, ResultOrigin::Evaluated);
        assert_eq!(report.results[0].status, Status::Pass);
        for (result, id) in report.results.iter().zip(ids).skip(1) {
            assert_eq!(result.requirement_id, id);
            assert_eq!(result.origin, ResultOrigin::Cancelled);
            assert_eq!(result.status, Status::NotApplicable);
        }
        // B, C and D were started and dropped; E never started
        assert_eq!(fake.call_count(), 4);
        assert_eq!(fake.completed(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run() {
        let (orch, fake) = orchestrator(FakeEvaluator::always_pass());
        let token = CancelToken::new();
        token.cancel();

        let report = orch
            .run_review_with_cancel(&checklist(&["A", "B"]), &doc(), &token)
            .await
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.not_applicable, 2);
        assert_eq!(report.compliance_percentage, 0.0);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (orch, _fake) = orchestrator(FakeEvaluator::always_fail());
        let orch = orch.with_progress(move |p| sink.lock().unwrap().push((p.completed, p.total)));

        orch.run_review(&checklist(&["A", "B"]), &doc()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_concurrency_floor() {
        let (orch, _fake) = orchestrator(FakeEvaluator::always_pass());
        assert_eq!(orch.with_concurrency(0).concurrency(), 1);
    }
}
