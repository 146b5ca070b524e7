//! Batch conversion of a folder tree of PDFs into layout text files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{LayoutConverter, Result};
use crate::error::PdfError;

/// Outcome of converting a folder.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Text files written.
    pub converted: Vec<PathBuf>,
    /// PDFs that failed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

impl ConversionReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }
}

/// Convert every PDF below `input_dir` into a `.txt` file in `output_dir`.
///
/// `progress` is called with `(current, total)` before each file. Single
/// files that fail are logged and skipped; the call only fails when the
/// folder is missing, holds no PDFs, or nothing converted.
pub fn convert_folder(
    input_dir: &Path,
    output_dir: &Path,
    converter: &dyn LayoutConverter,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<ConversionReport> {
    if !input_dir.exists() {
        return Err(PdfError::MissingFolder(input_dir.to_path_buf()));
    }
    fs::create_dir_all(output_dir).map_err(|e| PdfError::Converter(e.to_string()))?;

    let pdf_files = find_pdfs(input_dir);
    if pdf_files.is_empty() {
        return Err(PdfError::NoFiles(input_dir.to_path_buf()));
    }

    let total = pdf_files.len();
    info!("Found {} PDF files to convert with {}", total, converter.name());

    let mut report = ConversionReport::default();
    for (i, pdf_path) in pdf_files.iter().enumerate() {
        progress(i + 1, total);

        let relative = pdf_path.strip_prefix(input_dir).unwrap_or(pdf_path);
        let txt_path = output_dir.join(flat_text_name(relative));
        debug!("Converting ({}/{}): {}", i + 1, total, relative.display());

        let result = fs::read(pdf_path)
            .map_err(|e| PdfError::Parse(e.to_string()))
            .and_then(|data| converter.convert(&data))
            .and_then(|text| {
                fs::write(&txt_path, text.render()).map_err(|e| PdfError::Converter(e.to_string()))
            });

        match result {
            Ok(()) => report.converted.push(txt_path),
            Err(e) => {
                warn!("Failed to convert {}: {}", relative.display(), e);
                report.failures.push((pdf_path.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Conversion complete: {} converted, {} failed",
        report.converted.len(),
        report.failures.len()
    );

    if report.converted.is_empty() {
        return Err(PdfError::AllFailed(total));
    }
    Ok(report)
}

/// Flatten a relative PDF path into a unique text file name
/// (`a/b/c.pdf` → `a_b_c.txt`).
pub fn flat_text_name(relative: &Path) -> String {
    let flat = relative.to_string_lossy().replace(['/', '\\'], "_");
    Path::new(&flat).with_extension("txt").to_string_lossy().into_owned()
}

fn find_pdfs(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .map(|entry| entry.into_path())
        .collect()
}
