//! Convert command - turn a folder of PDFs into layout text files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use klx_core::{convert_folder, converter_from_config};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Folder of PDFs (searched recursively)
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Output folder for text files (default: the configured debug text folder)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

pub async fn run(args: ConvertArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.server.debug_txt_dir.clone());

    let converter = converter_from_config(&config.pdf);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let report = convert_folder(&args.input_dir, &output_dir, converter.as_ref(), &mut |i, n| {
        pb.set_length(n as u64);
        pb.set_position(i as u64);
        pb.set_message("converting");
    })?;
    pb.finish_and_clear();

    println!(
        "{} Converted {} of {} PDFs into {} in {:?}",
        style("✓").green(),
        report.converted.len(),
        report.total(),
        output_dir.display(),
        start.elapsed()
    );

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &report.failures {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}
