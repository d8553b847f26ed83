//! Report rendering and export
//!
//! Pure functions over a finished [`ReviewReport`](crate::review::ReviewReport);
//! only [`export_report`] touches the filesystem.

pub mod csv;
pub mod export;
pub mod listing;
pub mod markdown;

pub use csv::render_csv;
pub use export::{ExportedFiles, export_report};
pub use listing::render_categories;
pub use markdown::{render_report, render_template};

use crate::error::Result;
use crate::review::ReviewReport;

/// Serialize the report as pretty JSON
pub fn render_json(report: &ReviewReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
