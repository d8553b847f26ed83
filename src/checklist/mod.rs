//! Checklist Registry - loads and exposes the requirement set
//!
//! A checklist is loaded once per process and shared read-only between
//! review runs.

pub mod registry;
pub mod requirement;

pub use registry::{Checklist, ChecklistError, ChecklistFormat, UNSPECIFIED_REFERENCE};
pub use requirement::{CategoryGroup, ChecklistRequirement, RequirementSummary};
