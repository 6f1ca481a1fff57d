//! Extract command - run attachment extraction on a raw email file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use ledgermail_core::email::AttachmentExtractor;
use ledgermail_core::Extraction;

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Raw email file (.eml)
    #[arg(required = true)]
    input: PathBuf,

    /// Allowed sender domain (default: from configuration)
    #[arg(short, long)]
    domain: Option<String>,

    /// Write the attachment to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut config = load_config(config_path)?;
    if let Some(domain) = args.domain {
        config.email.allowed_domain = domain;
    }
    if config.email.allowed_domain.is_empty() {
        anyhow::bail!("No sender domain configured. Pass --domain or set email.allowed_domain.");
    }

    let raw = fs::read(&args.input)?;
    info!("Extracting attachment from {}", args.input.display());

    match AttachmentExtractor::new(&config.email).extract(&raw)? {
        Extraction::Accepted(attachment) => {
            println!(
                "{} {} ({}, {} bytes)",
                style("✓").green(),
                attachment.filename,
                attachment.content_type,
                attachment.bytes.len()
            );

            if let Some(output_path) = &args.output {
                fs::write(output_path, &attachment.bytes)?;
                println!(
                    "{} Attachment written to {}",
                    style("✓").green(),
                    output_path.display()
                );
            }
        }
        Extraction::Rejected(reason) => {
            println!("{} Rejected: {}", style("ℹ").blue(), reason);
        }
    }

    Ok(())
}
