//! End-to-end review flow tests
//!
//! Exercises checklist loading, document loading, the orchestrator and the
//! renderers through the public API with deterministic evaluators.

use std::sync::Arc;
use std::time::Duration;

use complyr::checklist::Checklist;
use complyr::document::{Document, DocumentLoader, SourceFormat};
use complyr::llm::MockLlmClient;
use complyr::report;
use complyr::review::types::{CANCELLED_COMMENT, NOT_APPLICABLE_HINT, SERVICE_ERROR_HINT};
use complyr::review::{
    CancelToken, EvaluationUnit, FakeEvaluator, LlmEvaluator, ResultOrigin, ReviewError, ReviewOrchestrator, Status,
    generate_template,
};
use tempfile::TempDir;

const THREE_ITEMS: &str = r#"{
  "items": [
    {"id": "A", "category": "Functional Description", "requirement": "Purpose", "description": "Purpose is stated", "iso_clause": "5.4.1 a)"},
    {"id": "B", "category": "Operating Conditions", "requirement": "Temperature range", "description": "Range is stated", "iso_clause": "5.4.1 c)"},
    {"id": "C", "category": "Boundaries and Interfaces", "requirement": "Interfaces", "description": "Interfaces are listed"}
  ]
}"#;

fn three_items() -> Checklist {
    Checklist::from_str_auto(THREE_ITEMS).unwrap()
}

fn item_definition() -> Document {
    Document::from_text(
        "item_definition.txt",
        "Electric power steering ECU. Provides steering assist at all vehicle speeds.",
    )
}

fn orchestrator(fake: FakeEvaluator) -> (ReviewOrchestrator, Arc<FakeEvaluator>) {
    let fake = Arc::new(fake);
    (ReviewOrchestrator::new(EvaluationUnit::new(fake.clone())), fake)
}

#[tokio::test]
async fn test_worked_example_two_of_three() {
    let fake = FakeEvaluator::scripted()
        .pass("A")
        .fail("B", "add temperature range")
        .pass("C");
    let (orch, fake) = orchestrator(fake);

    let report = orch.run_review(&three_items(), &item_definition()).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.not_applicable, 0);
    assert_eq!(report.compliance_rounded(), 67);
    assert_eq!(report.results[1].improvement_hint, "add temperature range");
    assert_eq!(report.results[0].improvement_hint, NOT_APPLICABLE_HINT);
    assert_eq!(fake.call_count(), 3);

    let markdown = report::render_report(&report, &three_items());
    assert!(markdown.contains("67%"));
    assert!(markdown.contains("**ISO Clause:** N/A"));
}

#[tokio::test]
async fn test_empty_checklist_produces_no_report() {
    let (orch, fake) = orchestrator(FakeEvaluator::always_pass());
    let empty = Checklist::from_str_auto("[]").unwrap();

    let err = orch.run_review(&empty, &item_definition()).await.unwrap_err();
    assert!(matches!(err, ReviewError::EmptyChecklist));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_empty_document_makes_no_calls() {
    let checklist = Checklist::from_str_auto(
        r#"[{"id": "A", "category": "C", "requirement": "R", "description": "D"},
            {"id": "B", "category": "C", "requirement": "R", "description": "D"}]"#,
    )
    .unwrap();
    let (orch, fake) = orchestrator(FakeEvaluator::always_pass());

    let err = orch
        .run_review(&checklist, &Document::from_text("blank.txt", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::EmptyDocument { .. }));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_always_error_degrades_every_item() {
    let (orch, _fake) = orchestrator(FakeEvaluator::always_error());
    let report = orch
        .with_concurrency(2)
        .run_review(&three_items(), &item_definition())
        .await
        .unwrap();

    assert_eq!(report.failed, 3);
    assert_eq!(report.compliance_rounded(), 0);
    assert_eq!(report.service_errors(), 3);
    assert!(report.results.iter().all(|r| r.improvement_hint == SERVICE_ERROR_HINT));
}

#[tokio::test]
async fn test_one_error_among_passes() {
    let fake = FakeEvaluator::scripted().pass("A").error("B", "connection reset").pass("C");
    let (orch, _fake) = orchestrator(fake);

    let report = orch.run_review(&three_items(), &item_definition()).await.unwrap();
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.results[1].origin, ResultOrigin::ServiceError);
    assert!(report.results[1].comment.contains("connection reset"));
}

#[tokio::test]
async fn test_order_preserved_when_completions_reverse() {
    let fake = FakeEvaluator::always_pass()
        .with_delay_for("A", Duration::from_millis(80))
        .with_delay_for("B", Duration::from_millis(40));
    let (orch, fake) = orchestrator(fake);

    let report = orch
        .with_concurrency(3)
        .run_review(&three_items(), &item_definition())
        .await
        .unwrap();

    let ids: Vec<_> = report.results.iter().map(|r| r.requirement_id.clone()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(fake.completed(), vec!["C", "B", "A"]);
}

#[tokio::test]
async fn test_cancellation_yields_partial_report() {
    let fake = FakeEvaluator::always_pass().with_delay(Duration::from_millis(50));
    let (orch, _fake) = orchestrator(fake);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(75)).await;
        trigger.cancel();
    });

    let report = orch
        .run_review_with_cancel(&three_items(), &item_definition(), &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[0].status, Status::Pass);
    assert_eq!(report.results[2].status, Status::NotApplicable);
    assert_eq!(report.results[2].comment, CANCELLED_COMMENT);
    assert_eq!(report.total, report.passed + report.failed + report.not_applicable);
}

#[tokio::test]
async fn test_llm_evaluator_end_to_end() {
    let mock = Arc::new(MockLlmClient::new().with_responses([
        r#"{"status": "Pass", "comment": "Section 1 states the purpose", "improvement_hint": "N/A"}"#,
        "```json\n{\"status\": \"FAIL\", \"comment\": \"No temperature range\", \"improvement_hint\": \"\"}\n```",
        "**Status:** Not Applicable\n**Comment:** The item has no external interfaces.\n**Hint for improvement:** N/A",
    ]));
    let unit = EvaluationUnit::new(Arc::new(LlmEvaluator::new(mock.clone())));
    let orch = ReviewOrchestrator::new(unit);

    let report = orch.run_review(&three_items(), &item_definition()).await.unwrap();

    assert_eq!(mock.call_count(), 3);
    assert_eq!(report.results[0].status, Status::Pass);
    assert_eq!(report.results[1].status, Status::Fail);
    assert_eq!(report.results[1].improvement_hint, "Add content addressing: Temperature range");
    assert_eq!(report.results[2].status, Status::NotApplicable);
    assert_eq!(report.compliance_rounded(), 50);
}

#[tokio::test]
async fn test_long_document_is_truncated_before_evaluation() {
    let mock = Arc::new(
        MockLlmClient::new().with_response(r#"{"status": "Pass", "comment": "ok", "improvement_hint": "N/A"}"#),
    );
    let unit = EvaluationUnit::new(Arc::new(LlmEvaluator::new(mock.clone()))).with_max_document_chars(100);
    let document = Document::from_text("long.txt", "x".repeat(5000));

    let report = ReviewOrchestrator::new(unit)
        .run_review(&three_items(), &document)
        .await
        .unwrap();

    assert_eq!(report.passed, 3);
    let prompt = &mock.requests()[0].messages[0].content;
    assert!(prompt.contains("[... content truncated ...]"));
    assert!(!prompt.contains(&"x".repeat(101)));
}

#[tokio::test]
async fn test_review_from_folder_and_export() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("item_definition_to_review");
    std::fs::create_dir(&docs).unwrap();
    std::fs::write(docs.join("steering.txt"), "Steering ECU item definition.").unwrap();

    let document = DocumentLoader::new().load(&docs).unwrap();
    assert_eq!(document.source_format, SourceFormat::Text);
    assert_eq!(document.source_name, "steering.txt");

    let (orch, _fake) = orchestrator(FakeEvaluator::always_fail());
    let checklist = three_items();
    let report = orch.run_review(&checklist, &document).await.unwrap();

    let files = report::export_report(&report, &checklist, &dir.path().join("exports")).unwrap();
    assert!(files.archive.is_file());
    let csv = std::fs::read_to_string(files.csv).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(2).unwrap().starts_with("B;Temperature range;5.4.1 c);Fail;"));
}

#[test]
fn test_template_mirrors_bundled_checklist() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/checklists/item_definition_checklist.json");
    let checklist = Checklist::load(path).unwrap();
    assert_eq!(checklist.title(), Some("ISO 26262 Part 3 - Item Definition"));

    let template = generate_template(&checklist);
    assert_eq!(template.len(), checklist.len());
    for (entry, requirement) in template.iter().zip(checklist.iter()) {
        assert_eq!(entry.id, requirement.id);
        assert!(entry.status.is_empty());
    }

    let markdown = report::render_template(&template, checklist.title(), &chrono::Utc::now());
    assert!(markdown.contains(&format!("*Total Checklist Items: {}*", checklist.len())));
}
