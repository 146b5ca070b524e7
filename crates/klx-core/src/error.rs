//! Error types for the klx-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the klx library.
#[derive(Error, Debug)]
pub enum KlxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The conversion stage of a batch produced nothing usable.
    #[error("PDF conversion failed: {0}")]
    ConversionFailed(#[source] PdfError),

    /// Statement extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Spreadsheet export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The external converter could not be run.
    #[error("external converter failed: {0}")]
    Converter(String),

    /// The input folder does not exist.
    #[error("input folder does not exist: {}", .0.display())]
    MissingFolder(PathBuf),

    /// No PDF files were found below the input folder.
    #[error("no PDF files found in {}", .0.display())]
    NoFiles(PathBuf),

    /// Every PDF in the batch failed to convert.
    #[error("PDF conversion failed for all {0} files")]
    AllFailed(usize),
}

/// Errors related to statement field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The text folder does not exist.
    #[error("text folder does not exist: {}", .0.display())]
    MissingFolder(PathBuf),

    /// No text files were found.
    #[error("no text files found in {}", .0.display())]
    NoFiles(PathBuf),

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: &'static str, value: String },
}

/// Errors related to spreadsheet export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing the workbook failed.
    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// Reading the template workbook failed.
    #[error("failed to read template {}: {reason}", .path.display())]
    Template { path: PathBuf, reason: String },

    /// Saving the filled-in template failed.
    #[error("failed to save {}: {reason}", .path.display())]
    TemplateSave { path: PathBuf, reason: String },

    /// A field mapping names an invalid column.
    #[error("invalid column letter: {0}")]
    InvalidColumn(String),

    /// There were no records to export.
    #[error("no records to export")]
    NoRecords,
}

/// Result type for the klx library.
pub type Result<T> = std::result::Result<T, KlxError>;
