mod analytics;
mod error;
mod ingest;
mod invariants;
mod models;
mod parser;
mod report;

use analytics::{DEFAULT_TOP_ADDRESSES, DEFAULT_TOP_ENDPOINTS, TopLimits};
use clap::{Parser, ValueEnum};
use error::AnalyzerError;
use ingest::analyze_file;
use models::Report;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Summarises Apache Common Log Format access logs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Access logs to analyse; each one gets its own report
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,

    /// Write `<stem>.report.txt` / `<stem>.report.json` here instead of stdout
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_TOP_ADDRESSES)]
    top_addresses: usize,

    #[arg(long, default_value_t = DEFAULT_TOP_ENDPOINTS)]
    top_endpoints: usize,

    /// Debug logging when RUST_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Both,
}

impl OutputFormat {
    fn text(self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }
    fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args).await {
        error!("{e}");
        return Err(e.into());
    }
    Ok(())
}

async fn run(args: &Args) -> error::Result<()> {
    let limits = TopLimits {
        addresses: args.top_addresses,
        endpoints: args.top_endpoints,
    };
    let handles: Vec<_> = args
        .files
        .iter()
        .map(|path| spawn_analysis(path.clone(), limits))
        .collect();

    if let Some(dir) = &args.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| AnalyzerError::Write {
                path: dir.clone(),
                source,
            })?;
    }

    for (name, handle) in report_names(&args.files).into_iter().zip(handles) {
        let report = handle.await??;
        emit(&name, &report, args.format, args.output_dir.as_deref()).await?;
    }
    Ok(())
}

/// Base names for written reports, one per input. A stem shared by several
/// inputs is prefixed with the input's 1-based position.
fn report_names(files: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = files
        .iter()
        .map(|path| {
            path.file_stem()
                .map_or_else(|| "report".into(), |s| s.to_string_lossy().into_owned())
        })
        .collect();
    stems
        .iter()
        .enumerate()
        .map(|(i, stem)| {
            if stems.iter().filter(|other| *other == stem).count() > 1 {
                format!("{}-{stem}", i + 1)
            } else {
                stem.clone()
            }
        })
        .collect()
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Each file is an independent run with its own aggregator.
fn spawn_analysis(path: PathBuf, limits: TopLimits) -> JoinHandle<error::Result<Report>> {
    tokio::spawn(analyze_file(path, limits))
}

async fn emit(
    name: &str,
    report: &Report,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> error::Result<()> {
    if format.text() {
        let text = report::to_text(report);
        write_or_print(output_dir.map(|d| d.join(format!("{name}.report.txt"))), text).await?;
    }
    if format.json() {
        let json = serde_json::to_string_pretty(&report::to_structured(report))? + "\n";
        write_or_print(output_dir.map(|d| d.join(format!("{name}.report.json"))), json).await?;
    }
    Ok(())
}

async fn write_or_print(target: Option<PathBuf>, contents: String) -> error::Result<()> {
    match target {
        Some(path) => {
            tokio::fs::write(&path, contents)
                .await
                .map_err(|source| AnalyzerError::Write {
                    path: path.clone(),
                    source,
                })?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{contents}"),
    }
    Ok(())
}
