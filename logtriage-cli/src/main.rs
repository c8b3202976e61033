// logtriage CLI - generate a markdown incident report from a log export

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use logtriage_core::{default_report_path, save_report, LogTriage, NO_ERROR_LOGS_FOUND};
use tracing::info;

#[derive(Parser)]
#[command(name = "logtriage")]
#[command(about = "AI-assisted root-cause analysis for CSV/JSON log exports", long_about = None)]
#[command(version)]
struct Cli {
    /// Log export to analyze (.csv or .json)
    file: PathBuf,

    /// Completion provider (gemini or openrouter)
    #[arg(short, long, default_value = "gemini")]
    provider: String,

    /// API key (falls back to config file, then {PROVIDER}_API_KEY)
    #[arg(long, env = "LOGTRIAGE_API_KEY")]
    api_key: Option<String>,

    /// Override the provider's default model
    #[arg(short, long)]
    model: Option<String>,

    /// Report output path (defaults to a timestamped incident_report_*.md)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let triage = LogTriage::new()?;
    info!(
        "Analyzing {} with provider {}",
        cli.file.display(),
        cli.provider
    );

    let report = triage
        .generate_report(
            &cli.file,
            &cli.provider,
            cli.api_key.as_deref(),
            cli.model.as_deref(),
        )
        .await?;

    if report == NO_ERROR_LOGS_FOUND {
        println!("{}", NO_ERROR_LOGS_FOUND);
        return Ok(());
    }

    if cli.stdout {
        println!("{}", report);
        return Ok(());
    }

    let output_path = cli.output.unwrap_or_else(default_report_path);
    save_report(&report, &output_path)?;
    println!("Report written to {}", output_path.display());
    Ok(())
}
