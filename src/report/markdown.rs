//! Markdown rendering of review reports and blank templates

use chrono::{DateTime, Local, Utc};

use crate::checklist::Checklist;
use crate::review::types::{NOT_APPLICABLE_HINT, ReviewReport};
use crate::review::TemplateEntry;

/// Heading used when the checklist source carries no title
pub const DEFAULT_TITLE: &str = "Compliance Review";

/// Category heading for results whose requirement is not in the checklist
const UNCATEGORIZED: &str = "Uncategorized";

fn local_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render the full review report.
///
/// Results keep checklist order; a category heading is emitted whenever the
/// category changes.
pub fn render_report(report: &ReviewReport, checklist: &Checklist) -> String {
    let title = checklist.title().unwrap_or(DEFAULT_TITLE);
    let mut out = String::new();

    out.push_str(&format!("# {} - Review Report\n\n", title));
    out.push_str(&format!(
        "*Document: {} ({})*\n",
        report.document_name, report.source_format
    ));
    out.push_str(&format!("*Generated: {}*\n\n", local_timestamp(&report.generated_at)));

    out.push_str("## Summary\n\n");
    out.push_str(&format!("- **Total requirements:** {}\n", report.total));
    out.push_str(&format!("- **Passed:** {}\n", report.passed));
    out.push_str(&format!("- **Failed:** {}\n", report.failed));
    out.push_str(&format!("- **Not Applicable:** {}\n", report.not_applicable));
    out.push_str(&format!("- **Compliance:** {}%\n", report.compliance_rounded()));

    if report.cancelled {
        out.push_str(
            "\n> **Review incomplete:** the run was cancelled; requirements not evaluated are marked Not Applicable.\n",
        );
    }
    let service_errors = report.service_errors();
    if service_errors > 0 {
        out.push_str(&format!(
            "\n> **{} evaluation(s) could not be completed** and are recorded as Fail.\n",
            service_errors
        ));
    }
    out.push_str("\n---\n");

    let mut current_category: Option<&str> = None;
    for result in &report.results {
        let requirement = checklist.get(&result.requirement_id);
        let category = requirement.map(|r| r.category.as_str()).unwrap_or(UNCATEGORIZED);

        if current_category != Some(category) {
            out.push_str(&format!("\n## {}\n", category));
            current_category = Some(category);
        }

        out.push('\n');
        out.push_str(&format!("**ID:** {}\n", result.requirement_id));
        out.push_str(&format!(
            "**Requirement:** {}\n",
            requirement.map(|r| r.requirement_title.as_str()).unwrap_or("")
        ));
        out.push_str(&format!(
            "**ISO Clause:** {}\n",
            requirement
                .map(|r| r.standard_reference.as_str())
                .unwrap_or(NOT_APPLICABLE_HINT)
        ));
        out.push_str(&format!("**Result:** {}\n", result.status));
        out.push_str(&format!("**Comment:** {}\n", result.comment));
        out.push_str(&format!("**Suggestion:** {}\n", result.improvement_hint));
        out.push_str("\n---\n");
    }

    out
}

/// Render a blank review template
pub fn render_template(entries: &[TemplateEntry], title: Option<&str>, generated_at: &DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {} - Review Template\n", title.unwrap_or(DEFAULT_TITLE)));
    out.push_str(&format!("*Generated: {}*\n", local_timestamp(generated_at)));
    out.push_str(&format!("*Total Checklist Items: {}*\n\n", entries.len()));

    out.push_str("**Instructions:**\n");
    out.push_str("- Fill in Status: Pass / Fail / Not Applicable\n");
    out.push_str("- Provide detailed Comment with evidence\n");
    out.push_str("- Add Hint for improvement for failed items\n\n");
    out.push_str("---\n\n");

    for entry in entries {
        out.push_str(&format!("**ID:** {}\n", entry.id));
        out.push_str(&format!("**Category:** {}\n", entry.category));
        out.push_str(&format!("**Requirement:** {}\n", entry.requirement_title));
        out.push_str(&format!("**Description:** {}\n", entry.description));
        out.push_str(&format!("**ISO Clause:** {}\n", entry.standard_reference));
        out.push_str(&format!("**Status:** {}\n", entry.status));
        out.push_str(&format!("**Comment:** {}\n", entry.comment));
        out.push_str(&format!("**Hint for improvement:** {}\n", entry.improvement_hint));
        out.push_str("\n---\n\n");
    }

    out
}
