//! Writes a finished report to the export directory

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::csv::render_csv;
use super::markdown::render_report;
use crate::checklist::Checklist;
use crate::error::Result;
use crate::review::ReviewReport;

/// File name stem shared by every export
pub const EXPORT_PREFIX: &str = "item_definition_review";

/// Paths written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub markdown: PathBuf,
    pub csv: PathBuf,
    /// Zip bundle holding both files
    pub archive: PathBuf,
}

/// Write `<prefix>_<timestamp>.md`, `.csv` and a `.zip` bundling both into
/// `dir`, creating it if needed
pub fn export_report(report: &ReviewReport, checklist: &Checklist, dir: &Path) -> Result<ExportedFiles> {
    fs::create_dir_all(dir)?;

    let stamp = report
        .generated_at
        .with_timezone(&Local)
        .format("%Y%m%d_%H%M%S");
    let stem = format!("{}_{}", EXPORT_PREFIX, stamp);

    let files = ExportedFiles {
        markdown: dir.join(format!("{}.md", stem)),
        csv: dir.join(format!("{}.csv", stem)),
        archive: dir.join(format!("{}.zip", stem)),
    };

    let markdown = render_report(report, checklist);
    let csv = render_csv(report, checklist);

    fs::write(&files.markdown, &markdown)?;
    fs::write(&files.csv, &csv)?;
    write_archive(
        &files.archive,
        &[
            (format!("{}.md", stem), markdown.as_str()),
            (format!("{}.csv", stem), csv.as_str()),
        ],
    )?;

    log::info!(
        "Exported review to {}, {} and {}",
        files.markdown.display(),
        files.csv.display(),
        files.archive.display()
    );
    Ok(files)
}

fn write_archive(path: &Path, entries: &[(String, &str)]) -> Result<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(content.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}
