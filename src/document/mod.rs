//! Document model and loading
//!
//! The review engine only ever sees a [`Document`]: an immutable text blob
//! with its source format and name. Locating and converting files is the
//! loader's job and never happens inside the engine.

pub mod extract;
pub mod loader;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{DocumentLoader, LoaderError};

/// Format the document text was converted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    Text,
    WordProcessor,
    Pdf,
}

impl SourceFormat {
    /// Map a file extension (case-insensitive) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Text),
            "docx" => Some(Self::WordProcessor),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Map a path's extension to a format
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Tag used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::WordProcessor => "word-processor",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The text under review, produced once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source_format: SourceFormat,
    pub source_name: String,
}

impl Document {
    /// Create a new document
    pub fn new(text: impl Into<String>, source_format: SourceFormat, source_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_format,
            source_name: source_name.into(),
        }
    }

    /// Plain-text document, mostly for tests and piped input
    pub fn from_text(source_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(text, SourceFormat::Text, source_name)
    }

    /// Check if there is any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_extension("TXT"), Some(SourceFormat::Text));
        assert_eq!(SourceFormat::from_extension("docx"), Some(SourceFormat::WordProcessor));
        assert_eq!(SourceFormat::from_extension("Pdf"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("doc"), None);
    }

    #[test]
    fn test_source_format_serialization() {
        let json = serde_json::to_string(&SourceFormat::WordProcessor).unwrap();
        assert_eq!(json, "\"word-processor\"");
        assert_eq!(SourceFormat::WordProcessor.to_string(), "word-processor");
    }

    #[test]
    fn test_document_is_blank() {
        assert!(Document::from_text("a.txt", "  \n").is_blank());
        assert!(!Document::from_text("a.txt", "x").is_blank());
    }
}
