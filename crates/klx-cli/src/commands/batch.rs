//! Batch command - convert, extract and export a whole folder of statements.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use klx_core::{ExportMode, InvoiceRecord, PipelineObserver, Stage, run_pipeline};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Folder of statement PDFs (searched recursively)
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Output spreadsheet (default: the configured output file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder for intermediate text files (default: the configured debug text folder)
    #[arg(long)]
    text_dir: Option<PathBuf>,

    /// Also write a per-file summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,
}

/// Drives a progress bar from pipeline events.
struct ProgressObserver {
    pb: ProgressBar,
}

impl PipelineObserver for ProgressObserver {
    fn on_progress(&self, stage: Stage, current: usize, total: usize) {
        self.pb.set_position(stage.percent(current, total) as u64);
        self.pb.set_message(stage.describe(current, total));
    }

    fn on_record(&self, record: &InvoiceRecord) {
        if !record.is_success() {
            self.pb.println(format!(
                "{} {}: {}",
                style("✗").red(),
                record.filename,
                record.processing_errors.join("; ")
            ));
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let output = args
        .output
        .unwrap_or_else(|| config.export.output_file.clone());
    let text_dir = args
        .text_dir
        .unwrap_or_else(|| config.server.debug_txt_dir.clone());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    let observer = ProgressObserver { pb };

    let outcome = run_pipeline(&args.input_dir, &text_dir, &output, &config, &observer);
    match &outcome {
        Ok(_) => observer.pb.finish_with_message("Done"),
        Err(_) => observer.pb.abandon(),
    }
    let outcome = outcome?;

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &outcome.records)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let mode = match outcome.export_mode {
        ExportMode::Template => "template",
        ExportMode::Plain => "plain",
    };

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcome.summary.total_files,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcome.summary.successful_files).green(),
        style(outcome.summary.failed_files).red()
    );
    println!(
        "   Results written to {} ({} layout)",
        output.display(),
        mode
    );

    if !outcome.conversion.failures.is_empty() {
        println!();
        println!("{}", style("PDFs that could not be converted:").red());
        for (path, error) in &outcome.conversion.failures {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

fn write_summary(path: &Path, records: &[InvoiceRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "our_company_name",
        "invoice_number",
        "invoice_date",
        "total_amount",
        "currency",
        "error",
    ])?;

    for record in records {
        let status = if record.is_success() { "success" } else { "error" };
        wtr.write_record([
            record.filename.as_str(),
            status,
            record.our_company_name.as_str(),
            record.invoice_number.as_str(),
            record.invoice_date.as_str(),
            &record.total_amount.map(|a| a.to_string()).unwrap_or_default(),
            record.currency.as_str(),
            &record.processing_errors.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_marks_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let mut failed = InvoiceRecord::for_company("ACME");
        failed.filename = "acme.txt".to_string();
        failed.push_error("unsupported company: ACME");
        let mut ok = InvoiceRecord::for_company("KLARNA TEST UK");
        ok.filename = "uk.txt".to_string();

        write_summary(&path, &[failed, ok]).unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "acme.txt,error,ACME,,,,,unsupported company: ACME");
        assert_eq!(lines[2], "uk.txt,success,KLARNA TEST UK,,,,,");
    }
}
