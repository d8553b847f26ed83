//! Plain-text category listing of a checklist

use crate::checklist::Checklist;

/// Render categories in first-appearance order with their requirements
pub fn render_categories(checklist: &Checklist) -> String {
    let mut out = String::new();

    for group in checklist.list_by_category() {
        out.push_str(&format!("{} ({})\n", group.category, group.items.len()));
        for item in &group.items {
            out.push_str(&format!(
                "  {:<10} {} [{}]\n",
                item.id, item.requirement_title, item.standard_reference
            ));
        }
    }

    out
}
