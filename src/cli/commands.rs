//! CLI command definitions using clap.
//!
//! - review: evaluate a document against the checklist
//! - template: print a blank review template
//! - categories: list checklist requirements by category

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Complyr - checklist-driven compliance reviewer for technical documents
#[derive(Parser, Debug)]
#[command(name = "complyr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Output format for review reports
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Csv,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review a document against the checklist
    Review {
        /// Document file, or a folder holding exactly one document
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Checklist file (JSON or YAML)
        #[arg(short = 'k', long)]
        checklist: Option<PathBuf>,

        /// Maximum evaluations in flight
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Stop the review after this many seconds, keeping completed results
        #[arg(short, long)]
        timeout_secs: Option<u64>,

        /// Also write Markdown and CSV files to the export directory
        #[arg(short, long)]
        export: bool,

        /// Report format printed to stdout
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },

    /// Print a blank review template for the checklist
    Template {
        /// Checklist file (JSON or YAML)
        #[arg(short = 'k', long)]
        checklist: Option<PathBuf>,
    },

    /// List checklist requirements grouped by category
    Categories {
        /// Checklist file (JSON or YAML)
        #[arg(short = 'k', long)]
        checklist: Option<PathBuf>,
    },
}
