//! Parse command - turn a recorded OCR response into an invoice record.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use ledgermail_core::{ExpenseFieldParser, ExpenseParser, InvoiceRecord};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// OCR expense response (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let config = load_config(config_path)?;
    let text = fs::read_to_string(&args.input)?;

    let record = ExpenseFieldParser::new(config.extraction).parse_json(&text)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => print!("{}", format_text(&record)),
    }

    let missing = record.missing_fields();
    if !missing.is_empty() {
        eprintln!(
            "{} Missing fields: {}",
            style("⚠").yellow(),
            missing.join(", ")
        );
    }

    Ok(())
}

fn format_text(record: &InvoiceRecord) -> String {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let mut output = String::new();
    output.push_str(&format!("Invoice: {}\n", or_dash(record.invoice_id.clone())));
    output.push_str(&format!(
        "Date: {}\n",
        or_dash(record.receipt_date.map(|d| d.to_string()))
    ));
    output.push_str(&format!(
        "Net charge: {} {}\n",
        or_dash(record.net_charge.map(|n| n.to_string())),
        record.currency
    ));
    output
}
