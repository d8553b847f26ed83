//! Checklist domain types

use serde::{Deserialize, Serialize};

/// A single checkable criterion loaded from the checklist source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRequirement {
    /// Stable identifier used to cross-reference reports (e.g. `ITEM_001`)
    pub id: String,

    /// Grouping label, not unique
    pub category: String,

    /// Short statement of what must hold
    pub requirement_title: String,

    /// Longer explanation of the requirement
    pub description: String,

    /// Citation into the governing standard, carried through unchanged
    pub standard_reference: String,
}

impl ChecklistRequirement {
    /// Create a new requirement
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        requirement_title: impl Into<String>,
        description: impl Into<String>,
        standard_reference: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            requirement_title: requirement_title.into(),
            description: description.into(),
            standard_reference: standard_reference.into(),
        }
    }

    /// Short form used by category listings
    pub fn summary(&self) -> RequirementSummary {
        RequirementSummary {
            id: self.id.clone(),
            requirement_title: self.requirement_title.clone(),
            standard_reference: self.standard_reference.clone(),
        }
    }
}

/// Listing entry for a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSummary {
    pub id: String,
    pub requirement_title: String,
    pub standard_reference: String,
}

/// Requirements sharing a category, in checklist order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<RequirementSummary>,
}
