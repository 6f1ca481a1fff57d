//! Run command - process one storage event end to end.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use ledgermail_core::{
    ExpenseAnalyzer, HttpExpenseAnalyzer, LocalObjectStore, PdfRasterizer, PipelineOrchestrator,
    PipelineOutcome, ReplayAnalyzer, StorageEvent,
};

use super::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Storage event (JSON) naming the stored email
    #[arg(short, long, required = true)]
    event: PathBuf,

    /// Root directory of the local object store (one subdirectory per bucket)
    #[arg(short, long, required = true)]
    store_root: PathBuf,

    /// Replay a recorded OCR response instead of calling a service
    #[arg(long, conflicts_with = "ocr_endpoint", required_unless_present = "ocr_endpoint")]
    ocr_response: Option<PathBuf>,

    /// OCR service endpoint receiving the page image
    #[arg(long)]
    ocr_endpoint: Option<String>,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    config.validate()?;

    if !args.event.exists() {
        anyhow::bail!("Event file not found: {}", args.event.display());
    }
    let event: StorageEvent = serde_json::from_str(&fs::read_to_string(&args.event)?)?;

    let analyzer: Arc<dyn ExpenseAnalyzer> = match (&args.ocr_response, &args.ocr_endpoint) {
        (Some(path), _) => Arc::new(ReplayAnalyzer::from_file(path.clone())),
        (None, Some(endpoint)) => Arc::new(HttpExpenseAnalyzer::new(
            endpoint.clone(),
            Duration::from_secs(config.accounting.timeout_secs),
        )?),
        (None, None) => anyhow::bail!("Pass --ocr-response or --ocr-endpoint"),
    };

    let rasterizer = PdfRasterizer::from_config(&config.pdf);
    let pipeline = PipelineOrchestrator::new(
        config,
        Arc::new(LocalObjectStore::new(&args.store_root)),
        Arc::new(rasterizer),
        analyzer,
    )?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Processing email...");

    let result = pipeline.handle_event(&event).await;
    pb.finish_and_clear();

    let outcome = result?;
    match &outcome {
        PipelineOutcome::Skipped(reason) => {
            println!("{} Skipped: {}", style("ℹ").blue(), reason);
        }
        PipelineOutcome::Posted {
            record,
            confirmation,
        } => {
            info!("Accounting system answered: {}", confirmation);
            println!(
                "{} Posted invoice {}",
                style("✓").green(),
                record.invoice_id.as_deref().unwrap_or("(no reference)")
            );
        }
    }

    println!("{}", serde_json::to_string(&outcome.response())?);

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}
