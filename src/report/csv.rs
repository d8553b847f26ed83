//! Semicolon-delimited export for spreadsheet import

use std::borrow::Cow;

use crate::checklist::Checklist;
use crate::review::types::{NOT_APPLICABLE_HINT, ReviewReport};

pub const DELIMITER: char = ';';

pub const HEADER: [&str; 6] = ["ID", "Requirement", "Clause", "Status", "Comment", "Suggestion"];

/// Render one row per result, in report order
pub fn render_csv(report: &ReviewReport, checklist: &Checklist) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER);

    for result in &report.results {
        let requirement = checklist.get(&result.requirement_id);
        push_row(
            &mut out,
            [
                result.requirement_id.as_str(),
                requirement.map(|r| r.requirement_title.as_str()).unwrap_or(""),
                requirement
                    .map(|r| r.standard_reference.as_str())
                    .unwrap_or(NOT_APPLICABLE_HINT),
                result.status.label(),
                result.comment.as_str(),
                result.improvement_hint.as_str(),
            ],
        );
    }

    out
}

fn push_row<const N: usize>(out: &mut String, fields: [&str; N]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&escape(field));
    }
    out.push('\n');
}

/// Quote a field when it holds the delimiter, a quote or a line break
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
