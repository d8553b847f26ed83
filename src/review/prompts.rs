//! Prompts for the LLM-backed evaluator

use crate::checklist::ChecklistRequirement;

/// System prompt shared by every evaluation call
pub const SYSTEM_PROMPT: &str = "You are a Functional Safety expert conducting an ISO 26262 Part 3 \
Item Definition review. You assess one checklist requirement at a time against the supplied \
document and answer only with the requested JSON object.";

/// Build the user prompt for one requirement.
///
/// `document_text` is expected to be already bounded by the evaluation unit.
pub fn build_requirement_prompt(requirement: &ChecklistRequirement, document_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Item Definition Content\n\n");
    prompt.push_str(document_text);
    prompt.push_str("\n\n---\n\n");

    prompt.push_str("# Checklist Requirement\n\n");
    prompt.push_str(&format!("**ID:** {}\n", requirement.id));
    prompt.push_str(&format!("**Category:** {}\n", requirement.category));
    prompt.push_str(&format!("**Requirement:** {}\n", requirement.requirement_title));
    prompt.push_str(&format!("**Description:** {}\n", requirement.description));
    prompt.push_str(&format!("**Reference:** {}\n\n", requirement.standard_reference));
    prompt.push_str("---\n\n");

    prompt.push_str("# Your Task\n\n");
    prompt.push_str("1. Carefully read the requirement and description\n");
    prompt.push_str("2. Search for evidence in the Item Definition\n");
    prompt.push_str("3. Assess whether the requirement is satisfied\n");
    prompt.push_str("4. Provide specific evidence, citing sections, headings or content\n");
    prompt.push_str("5. Offer an actionable improvement if the requirement fails\n\n");

    prompt.push_str("# Review Criteria\n\n");
    prompt.push_str("- **Pass**: Requirement fully met with clear evidence in the document\n");
    prompt.push_str("- **Fail**: Requirement not met, unclear, or insufficient evidence\n");
    prompt.push_str("- **Not Applicable**: Requirement does not apply to this item\n\n");

    prompt.push_str("# Quality Guidelines\n\n");
    prompt.push_str("DO:\n");
    prompt.push_str("- Quote specific sections or headings as evidence\n");
    prompt.push_str("- Explain why the requirement passes or fails\n");
    prompt.push_str("- Give a constructive, actionable improvement hint on failure\n\n");
    prompt.push_str("DON'T:\n");
    prompt.push_str("- Give vague assessments without evidence\n");
    prompt.push_str("- Mark as Pass without citing where the requirement is met\n");
    prompt.push_str("- Use Not Applicable without justification\n");
    prompt.push_str("- Provide generic or unhelpful improvement hints\n\n");

    prompt.push_str("# Output Format\n\n");
    prompt.push_str("Respond with EXACTLY one JSON object and nothing else:\n\n");
    prompt.push_str("```json\n");
    prompt.push_str("{\n");
    prompt.push_str("  \"status\": \"Pass\" | \"Fail\" | \"Not Applicable\",\n");
    prompt.push_str("  \"comment\": \"<assessment with specific evidence from the document>\",\n");
    prompt.push_str("  \"improvement_hint\": \"<actionable suggestion if Fail, otherwise N/A>\"\n");
    prompt.push_str("}\n");
    prompt.push_str("```\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_requirement_and_document() {
        let req = ChecklistRequirement::new(
            "ITEM_003",
            "Operating Conditions",
            "Environmental conditions",
            "Temperature, humidity and vibration ranges are stated",
            "ISO 26262-3:2018, 5.4.1 c)",
        );
        let prompt = build_requirement_prompt(&req, "The ECU operates from -40 to 85 C.");

        assert!(prompt.contains("ITEM_003"));
        assert!(prompt.contains("Operating Conditions"));
        assert!(prompt.contains("Environmental conditions"));
        assert!(prompt.contains("ISO 26262-3:2018, 5.4.1 c)"));
        assert!(prompt.contains("-40 to 85 C"));
        assert!(prompt.contains("\"improvement_hint\""));
        assert!(prompt.contains("Not Applicable"));
    }
}
