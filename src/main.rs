use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use complyr::checklist::Checklist;
use complyr::document::DocumentLoader;
use complyr::llm::{AnthropicClient, LlmClient};
use complyr::report;
use complyr::review::{
    CancelToken, EvaluationUnit, LlmEvaluator, ReviewOrchestrator, ReviewReport, Status, generate_template,
};

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, OutputFormat};
use config::Config;

fn setup_logging(default_level: &str) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("complyr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("complyr.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Review {
            document,
            checklist,
            concurrency,
            timeout_secs,
            export,
            format,
        } => {
            let options = ReviewOptions {
                document: document.as_deref(),
                checklist: checklist.as_deref(),
                concurrency: *concurrency,
                timeout_secs: *timeout_secs,
                export: *export,
                format: *format,
            };
            handle_review_command(&options, config).await
        }
        Commands::Template { checklist } => handle_template_command(checklist.as_deref(), config),
        Commands::Categories { checklist } => handle_categories_command(checklist.as_deref(), config),
    }
}

struct ReviewOptions<'a> {
    document: Option<&'a Path>,
    checklist: Option<&'a Path>,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
    export: bool,
    format: OutputFormat,
}

fn load_checklist(path: Option<&Path>, config: &Config) -> Result<Checklist> {
    let path = path.unwrap_or(config.paths.checklist.as_path());
    let checklist = Checklist::load(path).context(format!("Failed to load checklist {}", path.display()))?;
    info!("Loaded {} requirements from {}", checklist.len(), path.display());
    Ok(checklist)
}

async fn handle_review_command(options: &ReviewOptions<'_>, config: &Config) -> Result<()> {
    let checklist = load_checklist(options.checklist, config)?;

    let document_path = options.document.unwrap_or(config.paths.document_dir.as_path());
    let document = DocumentLoader::new()
        .load(document_path)
        .context(format!("Failed to load document from {}", document_path.display()))?;

    eprintln!(
        "{} {} ({}, {} characters, {} requirements)",
        "Reviewing:".green(),
        document.source_name,
        document.source_format,
        document.text.chars().count(),
        checklist.len()
    );

    let client = Arc::new(AnthropicClient::new(config.llm.to_anthropic()).context("Failed to create LLM client")?);
    let evaluator = LlmEvaluator::new(client.clone()).with_max_tokens(config.llm.max_tokens);
    let unit = EvaluationUnit::new(Arc::new(evaluator))
        .with_max_document_chars(config.review.max_document_chars)
        .with_timeout(config.review.evaluation_timeout());

    let mut orchestrator = ReviewOrchestrator::new(unit)
        .with_concurrency(options.concurrency.unwrap_or(config.review.concurrency))
        .with_progress(|p| {
            eprintln!(
                "  [{}/{}] {} {}",
                p.completed,
                p.total,
                p.requirement_id,
                colored_status(p.status)
            )
        });
    if let Some(timeout) = options
        .timeout_secs
        .map(Duration::from_secs)
        .or(config.review.run_timeout())
    {
        orchestrator = orchestrator.with_run_timeout(timeout);
    }

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, finishing with partial results...".yellow());
            on_interrupt.cancel();
        }
    });

    let report = orchestrator
        .run_review_with_cancel(&checklist, &document, &cancel)
        .await
        .context("Review could not start")?;

    let usage = client.total_usage();
    info!(
        "Token usage: {} in, {} out, ~${:.4}",
        usage.input_tokens,
        usage.output_tokens,
        usage.cost_usd(client.model())
    );

    let rendered = match options.format {
        OutputFormat::Markdown => report::render_report(&report, &checklist),
        OutputFormat::Json => report::render_json(&report).context("Failed to serialize report")?,
        OutputFormat::Csv => report::render_csv(&report, &checklist),
    };
    println!("{}", rendered);

    print_summary(&report);

    if options.export {
        let files = report::export_report(&report, &checklist, &config.paths.export_dir)
            .context("Failed to export review")?;
        eprintln!("{} {}", "Exported:".green(), files.markdown.display());
        eprintln!("{} {}", "Exported:".green(), files.csv.display());
        eprintln!("{} {}", "Exported:".green(), files.archive.display());
    }

    Ok(())
}

fn colored_status(status: Status) -> ColoredString {
    match status {
        Status::Pass => status.label().green(),
        Status::Fail => status.label().red(),
        Status::NotApplicable => status.label().dimmed(),
    }
}

fn print_summary(report: &ReviewReport) {
    let compliance = format!("{}%", report.compliance_rounded());
    let compliance = if report.failed == 0 {
        compliance.green()
    } else {
        compliance.yellow()
    };
    eprintln!(
        "{} {} ({} passed, {} failed, {} not applicable)",
        "Compliance:".bold(),
        compliance,
        report.passed,
        report.failed,
        report.not_applicable
    );

    let service_errors = report.service_errors();
    if service_errors > 0 {
        eprintln!(
            "{} {} evaluation(s) could not be completed and were recorded as Fail",
            "Warning:".red(),
            service_errors
        );
    }
    if report.cancelled {
        eprintln!(
            "{} review was cancelled; unevaluated requirements are marked Not Applicable",
            "Warning:".yellow()
        );
    }
}

fn handle_template_command(checklist: Option<&Path>, config: &Config) -> Result<()> {
    let checklist = load_checklist(checklist, config)?;
    let entries = generate_template(&checklist);
    info!("Generated template with {} entries", entries.len());
    println!(
        "{}",
        report::render_template(&entries, checklist.title(), &chrono::Utc::now())
    );
    Ok(())
}

fn handle_categories_command(checklist: Option<&Path>, config: &Config) -> Result<()> {
    let checklist = load_checklist(checklist, config)?;
    print!("{}", report::render_categories(&checklist));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(level).context("Failed to setup logging")?;

    match &config.source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
