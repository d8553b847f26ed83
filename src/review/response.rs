//! Parsing of evaluation service output into a [`ServiceVerdict`]
//!
//! The model is asked for a bare JSON object, but real responses wrap it in
//! code fences or prose, and older prompts produced a labelled block:
//!
//! ```text
//! **Status:** Fail
//! **Comment:** No operating temperature range is given.
//! **Hint for improvement:** Add the ambient temperature range.
//! ```
//!
//! All three shapes are accepted.

use std::sync::LazyLock;

use regex::Regex;

use super::evaluator::{EvaluationError, ServiceVerdict};

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("fenced json pattern is valid")
});

static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*[-*]*\s*\**\s*(status|result|comment|justification|hint for improvement|improvement hint|suggestion)\s*\**\s*:\s*\**\s*(.*)$",
    )
    .expect("label pattern is valid")
});

/// Parse raw service output into an unvalidated verdict
pub fn parse_verdict(raw: &str) -> Result<ServiceVerdict, EvaluationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(EvaluationError::Malformed("empty response".to_string()));
    }

    if let Some(verdict) = parse_json_object(text) {
        return Ok(verdict);
    }

    if let Some(caps) = FENCED_JSON.captures(text)
        && let Some(verdict) = parse_json_object(&caps[1])
    {
        return Ok(verdict);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
        && let Some(verdict) = parse_json_object(&text[start..=end])
    {
        return Ok(verdict);
    }

    if let Some(verdict) = parse_labelled(text) {
        return Ok(verdict);
    }

    Err(EvaluationError::Malformed(format!(
        "no status found in response: {}",
        preview(text)
    )))
}

fn parse_json_object(candidate: &str) -> Option<ServiceVerdict> {
    let verdict: ServiceVerdict = serde_json::from_str(candidate.trim()).ok()?;
    if verdict.status.trim().is_empty() {
        return None;
    }
    Some(ServiceVerdict {
        status: verdict.status.trim().to_string(),
        comment: verdict.comment.trim().to_string(),
        improvement_hint: verdict.improvement_hint.map(|h| h.trim().to_string()),
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Status,
    Comment,
    Hint,
}

fn parse_labelled(text: &str) -> Option<ServiceVerdict> {
    let mut status: Option<String> = None;
    let mut comment = String::new();
    let mut hint: Option<String> = None;
    let mut current: Option<Field> = None;

    for line in text.lines() {
        if line.trim() == "---" {
            // one verdict per response; stop at the first separator after a status
            if status.is_some() {
                break;
            }
            current = None;
            continue;
        }

        if let Some(caps) = LABEL_LINE.captures(line) {
            let label = caps[1].to_lowercase();
            // a plain `Result:` line is prose; only the bold form is a label
            let is_label = label != "result" || line.contains("**");
            if is_label {
                let field = match label.as_str() {
                    "status" | "result" => Field::Status,
                    "comment" | "justification" => Field::Comment,
                    _ => Field::Hint,
                };
                let value = strip_emphasis(&caps[2]);
                match field {
                    // first status wins
                    Field::Status if status.as_deref().is_none_or(str::is_empty) => status = Some(value),
                    Field::Status => {}
                    Field::Comment => comment = value,
                    Field::Hint => hint = Some(value),
                }
                current = Some(field);
                continue;
            }
        }

        let continuation = line.trim();
        if continuation.is_empty() {
            continue;
        }
        match current {
            Some(Field::Comment) => append_line(&mut comment, continuation),
            Some(Field::Hint) => append_line(hint.get_or_insert_with(String::new), continuation),
            _ => {}
        }
    }

    let status = status.filter(|s| !s.is_empty())?;
    Some(ServiceVerdict {
        status,
        comment,
        improvement_hint: hint,
    })
}

fn strip_emphasis(value: &str) -> String {
    value.trim().trim_matches('*').trim().to_string()
}

fn append_line(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(line);
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 80;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
