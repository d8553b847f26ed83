//! Document Loader - resolves one input file and converts it to text

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::extract::extract_text;
use super::{Document, SourceFormat};

/// Errors locating or reading the document under review
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("No document found in {0}")]
    NoFileFound(PathBuf),

    #[error("Expected exactly one document in {dir}, found {}: {}", .files.len(), .files.join(", "))]
    MultipleFilesFound { dir: PathBuf, files: Vec<String> },

    #[error("Unsupported document format: {0} (expected .txt, .docx or .pdf)")]
    UnsupportedFormat(String),

    #[error("Document {name} is unreadable: {reason}")]
    UnreadableContent { name: String, reason: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads a single document from an explicit location.
///
/// A directory is scanned for exactly one recognised file; a file path is
/// loaded directly. Raw bytes can be converted with [`DocumentLoader::load_bytes`].
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self
    }

    /// Load from a directory (single-file convention) or a file path
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document, LoaderError> {
        let path = path.as_ref();
        if path.is_dir() {
            let file = self.resolve_single(path)?;
            self.load_file(&file)
        } else {
            self.load_file(path)
        }
    }

    /// Find the single recognised document inside a directory.
    ///
    /// Hidden files and subdirectories are ignored. When the directory only
    /// holds unrecognised files the first one is reported as unsupported.
    pub fn resolve_single(&self, dir: &Path) -> Result<PathBuf, LoaderError> {
        let entries = std::fs::read_dir(dir).map_err(|source| LoaderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut recognised = Vec::new();
        let mut unrecognised = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|source| LoaderError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !path.is_file() {
                continue;
            }
            if SourceFormat::from_path(&path).is_some() {
                recognised.push(path);
            } else {
                unrecognised.push(name);
            }
        }

        recognised.sort();
        unrecognised.sort();

        match recognised.len() {
            1 => {
                let file = recognised.remove(0);
                log::info!("Found document: {}", file.display());
                Ok(file)
            }
            0 => match unrecognised.into_iter().next() {
                Some(name) => Err(LoaderError::UnsupportedFormat(name)),
                None => Err(LoaderError::NoFileFound(dir.to_path_buf())),
            },
            _ => Err(LoaderError::MultipleFilesFound {
                dir: dir.to_path_buf(),
                files: recognised.iter().map(|p| display_name(p)).collect(),
            }),
        }
    }

    /// Load one file, picking the converter from its extension
    pub fn load_file(&self, path: &Path) -> Result<Document, LoaderError> {
        let name = display_name(path);
        let format = SourceFormat::from_path(path).ok_or_else(|| LoaderError::UnsupportedFormat(name.clone()))?;

        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_bytes(name, format, &bytes)
    }

    /// Convert an in-memory buffer into a document
    pub fn load_bytes(
        &self,
        source_name: impl Into<String>,
        format: SourceFormat,
        bytes: &[u8],
    ) -> Result<Document, LoaderError> {
        let name = source_name.into();

        let text = extract_text(format, bytes).map_err(|reason| LoaderError::UnreadableContent {
            name: name.clone(),
            reason,
        })?;

        if text.trim().is_empty() {
            log::warn!("Document {} appears empty or unreadable", name);
            return Err(LoaderError::UnreadableContent {
                name,
                reason: "no text content".to_string(),
            });
        }

        log::info!("Extracted {} characters from {}", text.chars().count(), name);
        Ok(Document::new(text, format, name))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
