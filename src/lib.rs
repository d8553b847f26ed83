//! Complyr - checklist-driven compliance review of technical documents
//!
//! A checklist of requirements is evaluated one by one against a document
//! by a pluggable semantic evaluator, producing an ordered pass/fail report
//! with improvement hints.

pub mod checklist;
pub mod document;
pub mod error;
pub mod llm;
pub mod report;
pub mod review;

pub use error::{ComplyrError, Result};
