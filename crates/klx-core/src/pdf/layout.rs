//! Layout-preserving text extraction using lopdf and pdf-extract.
//!
//! Glyph positions reported by pdf-extract are placed on a fixed character
//! grid so that vertical gaps become blank lines and horizontal gaps become
//! runs of spaces.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, trace};

use super::{LayoutConverter, LayoutText, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Approximate ascent of a glyph as a fraction of its font size.
const ASCENT_RATIO: f64 = 0.8;

/// Converter that rebuilds page layout from glyph positions.
#[derive(Debug, Clone)]
pub struct PdfLayoutExtractor {
    x_density: f64,
    y_density: f64,
    x_tolerance: f64,
    y_tolerance: f64,
}

impl PdfLayoutExtractor {
    /// Create an extractor with the default grid.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    /// Create an extractor using the grid settings from the configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            x_density: config.x_density,
            y_density: config.y_density,
            x_tolerance: config.x_tolerance,
            y_tolerance: config.y_tolerance,
        }
    }

    /// Load a document, decrypting it with an empty password if needed.
    ///
    /// Returns the bytes pdf-extract should read.
    fn prepare(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let bytes = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }
        debug!("Loaded PDF with {} pages", page_count);

        Ok(bytes)
    }

    /// Lay out the glyphs of one page.
    pub fn layout_page(&self, glyphs: &[Glyph]) -> String {
        let mut sorted: Vec<&Glyph> = glyphs.iter().filter(|g| !g.text.is_empty()).collect();
        sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x.total_cmp(&b.x)));

        // Cluster glyphs into lines by their top coordinate.
        let mut lines: Vec<(f64, Vec<&Glyph>)> = Vec::new();
        for glyph in sorted {
            match lines.last_mut() {
                Some((top, members)) if (glyph.top - *top).abs() <= self.y_tolerance => {
                    members.push(glyph);
                }
                _ => lines.push((glyph.top, vec![glyph])),
            }
        }

        let mut out: Vec<String> = Vec::new();
        for (top, mut members) in lines {
            members.sort_by(|a, b| a.x.total_cmp(&b.x));

            let target = grid_index(top, self.y_density);
            let index = if out.is_empty() { target } else { target.max(out.len()) };
            while out.len() < index {
                out.push(String::new());
            }
            out.push(self.render_line(&members));
        }

        out.join("\n")
    }

    fn render_line(&self, glyphs: &[&Glyph]) -> String {
        let mut line = String::new();
        let mut column = 0usize;
        let mut last_end: Option<f64> = None;
        let mut pending_space = false;

        for glyph in glyphs {
            if glyph.text.trim().is_empty() {
                pending_space = last_end.is_some();
                continue;
            }

            let word_start = match last_end {
                None => true,
                Some(end) => pending_space || glyph.x - end > self.x_tolerance,
            };

            if word_start {
                let target = grid_index(glyph.x, self.x_density);
                if target > column {
                    line.extend(std::iter::repeat_n(' ', target - column));
                    column = target;
                } else if last_end.is_some() {
                    line.push(' ');
                    column += 1;
                }
            }

            line.push_str(&glyph.text);
            column += glyph.text.chars().count();
            last_end = Some(glyph.x + glyph.width);
            pending_space = false;
        }

        line
    }
}

impl Default for PdfLayoutExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutConverter for PdfLayoutExtractor {
    fn convert(&self, data: &[u8]) -> Result<LayoutText> {
        let bytes = self.prepare(data)?;

        // pdf-extract panics on some documents lopdf accepts (undefined
        // fonts, broken encodings).
        let collected = panic::catch_unwind(AssertUnwindSafe(|| -> Result<GlyphCollector> {
            let doc = pdf_extract::Document::load_mem(&bytes)
                .map_err(|e| PdfError::Parse(e.to_string()))?;
            let mut collector = GlyphCollector::default();
            pdf_extract::output_doc(&doc, &mut collector)
                .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
            Ok(collector)
        }));
        let collector = match collected {
            Ok(result) => result?,
            Err(_) => {
                return Err(PdfError::TextExtraction(
                    "PDF text extraction panicked (malformed document)".to_string(),
                ));
            }
        };

        let pages = collector
            .pages
            .iter()
            .map(|glyphs| self.layout_page(glyphs))
            .collect::<Vec<_>>();

        debug!("Laid out {} pages", pages.len());
        Ok(LayoutText::new(pages))
    }

    fn name(&self) -> &'static str {
        "builtin"
    }
}

/// A positioned glyph in page space, measured from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub x: f64,
    pub top: f64,
    pub width: f64,
    pub text: String,
}

impl Glyph {
    pub fn new(x: f64, top: f64, width: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            top,
            width,
            text: text.into(),
        }
    }
}

/// Collects glyphs page by page from pdf-extract.
///
/// Glyphs whose origin lies outside the page media box are dropped.
#[derive(Default)]
struct GlyphCollector {
    pages: Vec<Vec<Glyph>>,
    bounds: (f64, f64, f64, f64),
    dropped: usize,
}

impl GlyphCollector {
    fn on_page(&self, x: f64, y: f64) -> bool {
        let (llx, lly, urx, ury) = self.bounds;
        x >= llx && x <= urx && y >= lly && y <= ury
    }
}

impl OutputDev for GlyphCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        trace!("Begin page {}", page_num);
        self.bounds = (media_box.llx, media_box.lly, media_box.urx, media_box.ury);
        self.dropped = 0;
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        if self.dropped > 0 {
            debug!("Dropped {} glyphs outside the media box", self.dropped);
        }
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if !self.on_page(trm.m31, trm.m32) {
            trace!("Glyph {:?} at ({}, {}) is off the page", char, trm.m31, trm.m32);
            self.dropped += 1;
            return Ok(());
        }

        let scale = (trm.m21 * trm.m21 + trm.m22 * trm.m22).sqrt();
        let height = if scale > 0.0 { scale } else { font_size };
        let advance = width * (trm.m11 * trm.m11 + trm.m12 * trm.m12).sqrt();

        let glyph = Glyph {
            x: trm.m31,
            top: self.bounds.3 - trm.m32 - height * ASCENT_RATIO,
            width: advance,
            text: char.to_string(),
        };

        if let Some(page) = self.pages.last_mut() {
            page.push(glyph);
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

fn grid_index(position: f64, density: f64) -> usize {
    if position <= 0.0 || density <= 0.0 {
        0
    } else {
        (position / density).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::single_page_pdf;
    use pretty_assertions::assert_eq;

    /// Glyphs for `text` starting at `x`, each `advance` points wide.
    fn word(text: &str, x: f64, top: f64, advance: f64) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| Glyph::new(x + i as f64 * advance, top, advance, c.to_string()))
            .collect()
    }

    #[test]
    fn test_columns_follow_x_position() {
        let extractor = PdfLayoutExtractor::new();
        let mut glyphs = word("Invoice", 0.0, 0.0, 5.0);
        glyphs.extend(word("KL-1", 290.0, 0.0, 5.0));

        let page = extractor.layout_page(&glyphs);
        // 290 / 7.25 = column 40
        assert_eq!(page, format!("Invoice{}KL-1", " ".repeat(33)));
    }

    #[test]
    fn test_vertical_gaps_become_blank_lines() {
        let extractor = PdfLayoutExtractor::new();
        let mut glyphs = word("first", 0.0, 13.0, 5.0);
        glyphs.extend(word("second", 0.0, 52.0, 5.0));

        let page = extractor.layout_page(&glyphs);
        assert_eq!(page, "\nfirst\n\n\nsecond");
    }

    #[test]
    fn test_space_glyph_separates_words() {
        let extractor = PdfLayoutExtractor::new();
        let mut glyphs = word("Payout", 0.0, 0.0, 5.0);
        glyphs.push(Glyph::new(30.0, 0.0, 2.5, " "));
        glyphs.extend(word("date:", 32.5, 0.0, 5.0));

        assert_eq!(extractor.layout_page(&glyphs), "Payout date:");
    }

    #[test]
    fn test_glyphs_within_tolerance_share_a_line() {
        let extractor = PdfLayoutExtractor::new();
        let mut glyphs = word("AUD", 100.0, 40.5, 5.0);
        glyphs.extend(word("Payout", 0.0, 39.0, 5.0));

        let page = extractor.layout_page(&glyphs);
        let lines: Vec<&str> = page.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], format!("Payout{}AUD", " ".repeat(8)));
    }

    #[test]
    fn test_invalid_pdf_is_rejected() {
        let extractor = PdfLayoutExtractor::new();
        assert!(matches!(extractor.convert(b"not a pdf"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_convert_positions_text() {
        let extractor = PdfLayoutExtractor::new();
        let pdf = single_page_pdf(&[("Hello", 72, 700)], true);

        let text = extractor.convert(&pdf).unwrap();
        assert_eq!(text.pages.len(), 1);
        assert!(text.pages[0].contains("Hello"));
    }

    #[test]
    fn test_undefined_font_is_an_extraction_error() {
        let extractor = PdfLayoutExtractor::new();
        let pdf = single_page_pdf(&[("Hello", 72, 700)], false);

        assert!(matches!(extractor.convert(&pdf), Err(PdfError::TextExtraction(_))));
    }

    #[test]
    fn test_glyphs_off_the_page_are_dropped() {
        let extractor = PdfLayoutExtractor::new();
        let pdf = single_page_pdf(
            &[("Hello", 72, 700), ("Far", 72, -26_000_000), ("Wide", 90_000_000, 500)],
            true,
        );

        let text = extractor.convert(&pdf).unwrap();
        let page = &text.pages[0];
        assert!(page.lines().count() < 100);
        assert!(page.len() < 10_000);
        assert!(page.contains("Hello"));
        assert!(!page.contains("Far"));
        assert!(!page.contains("Wide"));
    }
}
