//! Converter backed by poppler's `pdftotext -layout`.

use std::io::Write;
use std::process::Command;

use tracing::debug;

use super::{LayoutConverter, LayoutText, Result};
use crate::error::PdfError;

/// Runs the external `pdftotext` executable in layout mode.
#[derive(Debug, Clone)]
pub struct PdftotextConverter {
    program: String,
}

impl PdftotextConverter {
    pub fn new() -> Self {
        Self {
            program: "pdftotext".to_string(),
        }
    }

    /// Use a specific executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for PdftotextConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutConverter for PdftotextConverter {
    fn convert(&self, data: &[u8]) -> Result<LayoutText> {
        let mut input = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| PdfError::Converter(e.to_string()))?;
        input
            .write_all(data)
            .map_err(|e| PdfError::Converter(e.to_string()))?;

        let output = Command::new(&self.program)
            .arg("-layout")
            .arg("-q")
            .arg(input.path())
            .arg("-")
            .output()
            .map_err(|e| PdfError::Converter(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(PdfError::TextExtraction(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let pages = split_pages(&text);
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("pdftotext produced {} pages", pages.len());
        Ok(LayoutText::new(pages))
    }

    fn name(&self) -> &'static str {
        "pdftotext"
    }
}

/// Split pdftotext output on form feeds, dropping the empty tail after the
/// last page break.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split('\x0C').map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    if pages.len() == 1 && pages[0].is_empty() {
        pages.clear();
    }
    pages
}
