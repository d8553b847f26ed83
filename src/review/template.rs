//! Blank review template derived from a checklist

use serde::{Deserialize, Serialize};

use crate::checklist::Checklist;

/// One requirement with empty assessment fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub id: String,
    pub category: String,
    pub requirement_title: String,
    pub description: String,
    pub standard_reference: String,
    pub status: String,
    pub comment: String,
    pub improvement_hint: String,
}

/// One entry per requirement, in checklist order
pub fn generate_template(checklist: &Checklist) -> Vec<TemplateEntry> {
    checklist
        .iter()
        .map(|req| TemplateEntry {
            id: req.id.clone(),
            category: req.category.clone(),
            requirement_title: req.requirement_title.clone(),
            description: req.description.clone(),
            standard_reference: req.standard_reference.clone(),
            status: String::new(),
            comment: String::new(),
            improvement_hint: String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::ChecklistRequirement;

    #[test]
    fn test_template_mirrors_checklist() {
        let checklist = Checklist::new(vec![
            ChecklistRequirement::new("ITEM_001", "Functionality", "Purpose", "Purpose stated", "5.4.1 a)"),
            ChecklistRequirement::new("ITEM_002", "Interfaces", "Interfaces", "Interfaces listed", "5.4.1 d)"),
        ])
        .unwrap();

        let template = generate_template(&checklist);
        assert_eq!(template.len(), 2);
        assert_eq!(template[0].id, "ITEM_001");
        assert_eq!(template[1].standard_reference, "5.4.1 d)");
        assert!(template.iter().all(|e| e.status.is_empty() && e.comment.is_empty() && e.improvement_hint.is_empty()));
    }

    #[test]
    fn test_template_empty_checklist() {
        assert!(generate_template(&Checklist::default()).is_empty());
    }
}
