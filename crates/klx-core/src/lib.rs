//! Core library for Klarna payout statement processing.
//!
//! This crate provides:
//! - PDF to layout-preserving text conversion
//! - OU company detection and per-company field extraction rules
//! - Spreadsheet export (template-mapped or plain)
//! - The convert → extract → export batch pipeline

pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod pipeline;

pub use error::{KlxError, Result};
pub use export::{ExportMode, SpreadsheetExporter, country_iso_code};
pub use extract::{OuCompany, PayoutParser, StatementParser, extract_folder};
pub use models::config::KlxConfig;
pub use models::record::{BatchSummary, InvoiceRecord};
pub use pdf::{
    LayoutConverter, LayoutText, PdfLayoutExtractor, PdftotextConverter, convert_folder,
    converter_from_config,
};
pub use pipeline::{
    NoopObserver, PipelineObserver, PipelineOutcome, Stage, process_file, run_pipeline,
};
