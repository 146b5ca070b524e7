//! Process command - extract a record from a single statement PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use klx_core::{PayoutParser, converter_from_config, process_file};

use super::output::{OutputFormat, format_records};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write the layout text to this path
    #[arg(long)]
    save_text: Option<PathBuf>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let converter = converter_from_config(&config.pdf);
    let (text, record) = process_file(&args.input, converter.as_ref(), &PayoutParser)?;

    if let Some(text_path) = &args.save_text {
        fs::write(text_path, &text)?;
        debug!("Layout text written to {}", text_path.display());
    }

    if !record.is_success() {
        eprintln!("{}", style("Extraction issues:").yellow());
        for issue in &record.processing_errors {
            eprintln!("  - {}", issue);
        }
    }

    let output = format_records(std::slice::from_ref(&record), args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
