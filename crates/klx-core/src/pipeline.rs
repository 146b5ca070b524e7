//! The convert → extract → export batch pipeline.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{KlxError, Result};
use crate::export::{ExportMode, SpreadsheetExporter};
use crate::extract::{PayoutParser, StatementParser, extract_folder};
use crate::models::config::KlxConfig;
use crate::models::record::{BatchSummary, InvoiceRecord};
use crate::pdf::{ConversionReport, LayoutConverter, convert_folder, converter_from_config, flat_text_name};

/// Pipeline stage reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Converting,
    Extracting,
    Exporting,
}

impl Stage {
    /// Overall progress in percent. Conversion covers 0-50 and extraction
    /// 50-100.
    pub fn percent(&self, current: usize, total: usize) -> u8 {
        let fraction = |base: usize| {
            if total == 0 {
                base
            } else {
                base + current.min(total) * 50 / total
            }
        };
        match self {
            Stage::Converting => fraction(0) as u8,
            Stage::Extracting => fraction(50) as u8,
            Stage::Exporting => 100,
        }
    }

    /// Human readable step description.
    pub fn describe(&self, current: usize, total: usize) -> String {
        match self {
            Stage::Converting => format!("Converting PDF {}/{}...", current, total),
            Stage::Extracting => format!("Extracting Data {}/{}...", current, total),
            Stage::Exporting => "Finalizing results...".to_string(),
        }
    }
}

/// Receives progress from a running pipeline.
pub trait PipelineObserver {
    /// Called before each file of a stage, and once when export starts.
    fn on_progress(&self, stage: Stage, current: usize, total: usize);

    /// Called as soon as each record is extracted.
    fn on_record(&self, _record: &InvoiceRecord) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_progress(&self, _stage: Stage, _current: usize, _total: usize) {}
}

/// Everything a finished pipeline produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub conversion: ConversionReport,
    pub records: Vec<InvoiceRecord>,
    pub summary: BatchSummary,
    pub export_mode: ExportMode,
}

/// Run the whole batch with the converter selected in `config`.
pub fn run_pipeline(
    upload_dir: &Path,
    text_dir: &Path,
    output_file: &Path,
    config: &KlxConfig,
    observer: &dyn PipelineObserver,
) -> Result<PipelineOutcome> {
    let converter = converter_from_config(&config.pdf);
    run_pipeline_with(
        converter.as_ref(),
        &PayoutParser,
        upload_dir,
        text_dir,
        output_file,
        config,
        observer,
    )
}

/// Run the whole batch with explicit converter and parser.
pub fn run_pipeline_with(
    converter: &dyn LayoutConverter,
    parser: &dyn StatementParser,
    upload_dir: &Path,
    text_dir: &Path,
    output_file: &Path,
    config: &KlxConfig,
    observer: &dyn PipelineObserver,
) -> Result<PipelineOutcome> {
    clear_dir(text_dir)?;

    info!("Converting PDFs from {}", upload_dir.display());
    let conversion = convert_folder(upload_dir, text_dir, converter, &mut |i, n| {
        observer.on_progress(Stage::Converting, i, n)
    })
    .map_err(KlxError::ConversionFailed)?;

    info!("Extracting fields from {}", text_dir.display());
    let records = extract_folder(
        text_dir,
        parser,
        &mut |i, n| observer.on_progress(Stage::Extracting, i, n),
        &mut |record| observer.on_record(record),
    )?;

    observer.on_progress(Stage::Exporting, 1, 1);
    let exporter = SpreadsheetExporter::new(config.export.clone());
    let export_mode = exporter.export(&records, output_file)?;

    let summary = BatchSummary::from_records(&records);
    info!(
        "Batch complete: {} files, {} succeeded, {} failed",
        summary.total_files, summary.successful_files, summary.failed_files
    );

    Ok(PipelineOutcome {
        conversion,
        records,
        summary,
        export_mode,
    })
}

/// Convert and parse a single PDF. Returns the layout text with the record.
pub fn process_file(
    pdf_path: &Path,
    converter: &dyn LayoutConverter,
    parser: &dyn StatementParser,
) -> Result<(String, InvoiceRecord)> {
    let data = fs::read(pdf_path)?;
    let text = converter.convert(&data)?.render();

    let name = pdf_path
        .file_name()
        .map(|n| flat_text_name(Path::new(n)))
        .unwrap_or_default();
    let record = parser.parse(&text, &name);
    Ok((text, record))
}

/// Remove the files directly inside `dir`, creating it when missing.
fn clear_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}
