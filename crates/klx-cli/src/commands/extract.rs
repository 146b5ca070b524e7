//! Extract command - run the extraction rules over layout text files.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use klx_core::{BatchSummary, PayoutParser, extract_folder};

use super::output::{OutputFormat, format_records};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Folder of `.txt` files produced by `convert`
    #[arg(required = true)]
    txt_dir: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let records = extract_folder(&args.txt_dir, &PayoutParser, &mut |_, _| {}, &mut |record| {
        tracing::debug!("Extracted {}", record.filename);
    })?;

    let output = format_records(&records, args.format)?;
    let summary = BatchSummary::from_records(&records);

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} records written to {} ({} failed)",
            style("✓").green(),
            summary.total_files,
            output_path.display(),
            summary.failed_files
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
