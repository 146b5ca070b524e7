//! Extraction over a folder of layout text files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::Result;
use super::parser::StatementParser;
use crate::error::ExtractionError;
use crate::models::record::InvoiceRecord;

/// Parse every `*.txt` file directly inside `txt_dir`, in file name order.
///
/// `progress` is called with `(current, total)` before each file and
/// `on_record` as soon as each record is built. Files that cannot be read
/// still produce a record describing the failure.
pub fn extract_folder(
    txt_dir: &Path,
    parser: &dyn StatementParser,
    progress: &mut dyn FnMut(usize, usize),
    on_record: &mut dyn FnMut(&InvoiceRecord),
) -> Result<Vec<InvoiceRecord>> {
    if !txt_dir.is_dir() {
        return Err(ExtractionError::MissingFolder(txt_dir.to_path_buf()));
    }

    let files = text_files(txt_dir)?;
    if files.is_empty() {
        return Err(ExtractionError::NoFiles(txt_dir.to_path_buf()));
    }

    let total = files.len();
    info!("Extracting fields from {} text files", total);

    let mut records = Vec::with_capacity(total);
    for (i, path) in files.iter().enumerate() {
        progress(i + 1, total);

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let record = match fs::read_to_string(path) {
            Ok(text) => parser.parse(&text, &filename),
            Err(e) => {
                warn!("Failed to read {}: {}", filename, e);
                InvoiceRecord::read_failure(&filename, e)
            }
        };

        if record.is_success() {
            debug!("Extracted {} ({})", filename, record.our_company_name);
        } else {
            debug!("Extracted {} with errors: {:?}", filename, record.processing_errors);
        }

        on_record(&record);
        records.push(record);
    }

    let failed = records.iter().filter(|r| !r.is_success()).count();
    info!(
        "Extraction complete: {} succeeded, {} with errors",
        total - failed,
        failed
    );
    Ok(records)
}

fn text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|_| ExtractionError::MissingFolder(dir.to_path_buf()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("txt"))
        .collect();
    files.sort();
    Ok(files)
}
