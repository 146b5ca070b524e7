//! Spreadsheet export of extracted records.
//!
//! Records are written either into a copy of a template workbook, with
//! each field placed in a configured column and the template's formatting
//! left intact, or as a plain table with a header row.

mod country;

pub use country::{DEFAULT_COUNTRY, country_code_for, country_iso_code, currency_country};

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::record::InvoiceRecord;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Longest text written to a cell before truncation.
pub const MAX_CELL_CHARS: usize = 32_700;

/// Number format applied to tax rate cells.
const PERCENT_FORMAT: &str = "0.00%";

/// Column holding the source file name in template mode.
const FILENAME_COLUMN: &str = "AY";
/// Column holding the document type in template mode.
const DOCUMENT_TYPE_COLUMN: &str = "O";
const DOCUMENT_TYPE: &str = "tax invoice";
/// Column holding the vendor country code in template mode.
const COUNTRY_COLUMN: &str = "S";

/// Plain-mode header, in record field order.
pub const PLAIN_HEADERS: [&str; 15] = [
    "invoice_number",
    "our_company_name",
    "our_company_address",
    "our_tax_id",
    "invoice_date",
    "net_amount",
    "tax_rate",
    "tax_amount",
    "total_amount",
    "currency",
    "vendor_name",
    "vendor_address",
    "vendor_tax_id",
    "filename",
    "processing_errors",
];

/// How a workbook was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    Template,
    Plain,
}

/// One cell value prepared for writing.
#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Number(f64),
    Percent(f64),
    Empty,
}

/// Writes records to `.xlsx` files.
pub struct SpreadsheetExporter {
    config: ExportConfig,
}

impl SpreadsheetExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export with the template when it exists, falling back to a plain
    /// table when it is missing or cannot be used.
    pub fn export(&self, records: &[InvoiceRecord], output: &Path) -> Result<ExportMode> {
        if records.is_empty() {
            return Err(ExportError::NoRecords);
        }

        let template = self.config.template_file.as_path();
        if template.exists() {
            match self.export_with_template(records, template, output) {
                Ok(()) => return Ok(ExportMode::Template),
                Err(e) => warn!("Template export failed, writing plain table: {}", e),
            }
        } else {
            info!("Template {} not found, writing plain table", template.display());
        }

        self.export_plain(records, output)?;
        Ok(ExportMode::Plain)
    }

    /// Fill the template sheet in place from `start_row` on and save the
    /// result to `output`. Everything else in the template is kept.
    pub fn export_with_template(
        &self,
        records: &[InvoiceRecord],
        template: &Path,
        output: &Path,
    ) -> Result<()> {
        let start_row = self.config.start_row.max(1);
        let mapping = self
            .config
            .field_mapping
            .iter()
            .map(|(field, column)| Ok((field.as_str(), sheet_column(column)?)))
            .collect::<Result<Vec<_>>>()?;
        let filename_col = sheet_column(FILENAME_COLUMN)?;
        let type_col = sheet_column(DOCUMENT_TYPE_COLUMN)?;
        let country_col = sheet_column(COUNTRY_COLUMN)?;

        let mut book = umya_spreadsheet::reader::xlsx::read(template).map_err(|e| {
            ExportError::Template {
                path: template.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        let worksheet = template_sheet(&mut book, &self.config.sheet_name).ok_or_else(|| {
            ExportError::Template {
                path: template.to_path_buf(),
                reason: "workbook has no sheets".to_string(),
            }
        })?;

        info!(
            "Writing {} records to sheet {:?} from row {} using {}",
            records.len(),
            worksheet.get_name(),
            start_row,
            template.display()
        );

        for (i, record) in records.iter().enumerate() {
            let row = start_row + i as u32;

            for &(field, col) in &mapping {
                match template_value(record, field) {
                    Some(value) => write_template_cell(worksheet, col, row, &value),
                    None => debug!("Unknown field {:?} in mapping, skipped", field),
                }
            }

            let filename = clean_cell(&record.filename);
            if !filename.is_empty() {
                worksheet.get_cell_mut((filename_col, row)).set_value_string(filename);
            }
            worksheet
                .get_cell_mut((type_col, row))
                .set_value_string(DOCUMENT_TYPE);
            worksheet
                .get_cell_mut((country_col, row))
                .set_value_string(country_iso_code(record));
        }

        umya_spreadsheet::writer::xlsx::write(&book, output).map_err(|e| {
            ExportError::TemplateSave {
                path: output.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        info!("Saved {}", output.display());
        Ok(())
    }

    /// Write a header row and one row per record.
    pub fn export_plain(&self, records: &[InvoiceRecord], output: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let percent = Format::new().set_num_format(PERCENT_FORMAT);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Sheet1")?;

        for (col, header) in PLAIN_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            for (col, value) in plain_row(record).iter().enumerate() {
                write_cell(worksheet, row, col as u16, value, &percent)?;
            }
        }

        workbook.save(output)?;
        info!("Saved {} records to {}", records.len(), output.display());
        Ok(())
    }
}

/// Drop control characters (keeping tab, LF and CR), collapse runs of
/// whitespace and cap the length.
pub fn clean_cell(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| (*c as u32) >= 0x20 || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_CELL_CHARS {
        let mut truncated: String = collapsed.chars().take(MAX_CELL_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        collapsed
    }
}

/// Zero-based column index for a column letter such as `AB`.
pub fn column_index(letters: &str) -> Result<u16> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return Err(ExportError::InvalidColumn(letters.to_string()));
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(ExportError::InvalidColumn(letters.to_string()));
        }
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    // XFD is the last column Excel allows.
    if index > 16_384 {
        return Err(ExportError::InvalidColumn(letters.to_string()));
    }
    Ok((index - 1) as u16)
}

/// One-based sheet column for a column letter.
fn sheet_column(letters: &str) -> Result<u32> {
    Ok(column_index(letters)? as u32 + 1)
}

/// Parse a printed rate such as `10.00%` into a fraction.
pub fn parse_percent(rate: &str) -> Option<f64> {
    let number = rate.trim().trim_end_matches('%').trim();
    number.parse::<f64>().ok().map(|v| v / 100.0)
}

fn decimal_to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

fn text(value: &str) -> CellValue {
    let cleaned = clean_cell(value);
    if cleaned.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(cleaned)
    }
}

/// Value of a mapped field in template mode. Amounts without a value are
/// written as zero; unparsable rates become zero.
fn template_value(record: &InvoiceRecord, field: &str) -> Option<CellValue> {
    let amount = |v: Option<Decimal>| CellValue::Number(decimal_to_f64(v).unwrap_or(0.0));

    let value = match field {
        "invoice_number" => text(&record.invoice_number),
        "our_company_name" => text(&record.our_company_name),
        "our_company_address" => text(&record.our_company_address),
        "our_tax_id" => text(&record.our_tax_id),
        "invoice_date" => text(&record.invoice_date),
        "net_amount" => amount(record.net_amount),
        "tax_rate" => CellValue::Percent(parse_percent(&record.tax_rate).unwrap_or(0.0)),
        "tax_amount" => amount(record.tax_amount),
        "total_amount" => amount(record.total_amount),
        "currency" => text(&record.currency),
        "vendor_name" => text(&record.vendor_name),
        "vendor_address" => text(&record.vendor_address),
        "vendor_tax_id" => text(&record.vendor_tax_id),
        "filename" => text(&record.filename),
        _ => return None,
    };
    Some(value)
}

fn plain_row(record: &InvoiceRecord) -> [CellValue; 15] {
    let amount = |v: Option<Decimal>| match decimal_to_f64(v) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Empty,
    };
    let errors = if record.processing_errors.is_empty() {
        CellValue::Empty
    } else {
        let cleaned: Vec<String> = record.processing_errors.iter().map(|e| clean_cell(e)).collect();
        CellValue::Text(serde_json::to_string(&cleaned).unwrap_or_default())
    };

    [
        text(&record.invoice_number),
        text(&record.our_company_name),
        text(&record.our_company_address),
        text(&record.our_tax_id),
        text(&record.invoice_date),
        amount(record.net_amount),
        text(&record.tax_rate),
        amount(record.tax_amount),
        amount(record.total_amount),
        text(&record.currency),
        text(&record.vendor_name),
        text(&record.vendor_address),
        text(&record.vendor_tax_id),
        text(&record.filename),
        errors,
    ]
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    percent: &Format,
) -> Result<()> {
    match value {
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Percent(n) => {
            worksheet.write_number_with_format(row, col, *n, percent)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

/// The sheet named `sheet_name`, else the first sheet.
fn template_sheet<'a>(
    book: &'a mut umya_spreadsheet::Spreadsheet,
    sheet_name: &str,
) -> Option<&'a mut umya_spreadsheet::Worksheet> {
    let index = book
        .get_sheet_collection()
        .iter()
        .position(|sheet| sheet.get_name() == sheet_name)
        .unwrap_or_else(|| {
            debug!("Sheet {:?} not in template, using the first sheet", sheet_name);
            0
        });
    book.get_sheet_mut(&index)
}

/// Write one value into a template cell. `col` and `row` are one-based.
fn write_template_cell(
    worksheet: &mut umya_spreadsheet::Worksheet,
    col: u32,
    row: u32,
    value: &CellValue,
) {
    match value {
        CellValue::Text(s) => {
            worksheet.get_cell_mut((col, row)).set_value_string(s.as_str());
        }
        CellValue::Number(n) => {
            worksheet.get_cell_mut((col, row)).set_value_number(*n);
        }
        CellValue::Percent(n) => {
            worksheet.get_cell_mut((col, row)).set_value_number(*n);
            worksheet
                .get_style_mut((col, row))
                .get_number_format_mut()
                .set_format_code(PERCENT_FORMAT);
        }
        CellValue::Empty => {}
    }
}
