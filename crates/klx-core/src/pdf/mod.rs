//! PDF to layout-preserving text conversion.

#[cfg(test)]
pub(crate) mod fixtures;
mod folder;
mod layout;
mod pdftotext;

pub use folder::{ConversionReport, convert_folder, flat_text_name};
pub use layout::PdfLayoutExtractor;
pub use pdftotext::PdftotextConverter;

use crate::error::PdfError;
use crate::models::config::{ConverterKind, PdfConfig};

/// Placeholder written for pages without any text.
pub const EMPTY_PAGE_TEXT: &str = "(No text found on this page)";

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Layout text of a whole document, one entry per page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutText {
    pub pages: Vec<String>,
}

impl LayoutText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Render the document the way the extraction rules expect it.
    ///
    /// Each page becomes `--- Page N ---`, its text (or a placeholder), and a
    /// blank line; the pieces are joined with `\n`.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.pages.len() * 3);
        for (i, page) in self.pages.iter().enumerate() {
            parts.push(format!("--- Page {} ---", i + 1));
            if page.trim().is_empty() {
                parts.push(EMPTY_PAGE_TEXT.to_string());
            } else {
                parts.push(page.clone());
            }
            parts.push(String::new());
        }
        parts.join("\n")
    }
}

/// Trait for PDF to layout text converters.
pub trait LayoutConverter: Send + Sync {
    /// Convert a PDF held in memory.
    fn convert(&self, data: &[u8]) -> Result<LayoutText>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the converter selected in the configuration.
pub fn converter_from_config(config: &PdfConfig) -> Box<dyn LayoutConverter> {
    match config.converter {
        ConverterKind::Builtin => Box::new(PdfLayoutExtractor::from_config(config)),
        ConverterKind::Pdftotext => Box::new(PdftotextConverter::new()),
    }
}
