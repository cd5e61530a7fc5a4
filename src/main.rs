//! CLI entry point for the deficiency rater.
//!
//! Reads every survey workbook in the input directory, rates disciplines and
//! deficiencies, and writes the aggregated results workbook.

use anyhow::{Context, Result};
use clap::Parser;
use deficiency_rater::analyzers::analyzer::Analyzer;
use deficiency_rater::config::RunConfig;
use deficiency_rater::loader::CalamineLoader;
use deficiency_rater::output::{ErrorLog, XlsxBarChart, XlsxReportWriter, print_json};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "deficiency_rater")]
#[command(about = "Rates disciplines and teaching deficiencies from survey workbooks", long_about = None)]
struct Cli {
    /// Directory containing the survey .xlsx/.xls files
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Results workbook to write
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Error log to append failures to
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + optional JSON rolling trace file
    let (json_writer, _file_guard) = match std::env::var("TRACE_FILE_PATH") {
        Ok(trace_path) if !trace_path.trim().is_empty() => {
            let trace_path = Path::new(&trace_path);
            let dir = trace_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = trace_path
                .file_name()
                .context("TRACE_FILE_PATH has no file name")?;
            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        _ => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = json_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(writer)
            .with_filter(
                EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()),
            )
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = RunConfig::from_env()
        .context("Invalid configuration")?
        .with_paths(cli.input_dir, cli.output, cli.log);
    info!(
        input_dir = %config.input_dir.display(),
        output = %config.output.display(),
        error_log = %config.error_log.display(),
        validation_mode = %config.validation_mode,
        theory_placement = %config.theory_placement,
        "Starting rating run"
    );

    let analyzer = Analyzer::new(
        CalamineLoader,
        XlsxReportWriter::<XlsxBarChart>::default(),
        config.validator(),
        ErrorLog::new(&config.error_log),
    )
    .with_mean_table(config.include_mean_table);

    let summary = analyzer
        .analyze(&config.input_dir, &config.output)
        .with_context(|| format!("Rating run over {} failed", config.input_dir.display()))?;

    info!(
        discovered = summary.discovered,
        processed = summary.processed,
        skipped = summary.skipped.len(),
        output = %summary.output.display(),
        "Run complete"
    );
    print_json(&summary)?;

    Ok(())
}
