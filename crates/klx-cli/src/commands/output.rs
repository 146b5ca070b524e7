//! Record formatting shared by `extract` and `process`.

use clap::ValueEnum;
use klx_core::InvoiceRecord;
use klx_core::export::PLAIN_HEADERS;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn format_records(records: &[InvoiceRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(records.iter().map(format_text).collect::<Vec<_>>().join("\n")),
    }
}

fn amount<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_csv(records: &[InvoiceRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(PLAIN_HEADERS)?;

    for record in records {
        wtr.write_record([
            record.invoice_number.clone(),
            record.our_company_name.clone(),
            record.our_company_address.clone(),
            record.our_tax_id.clone(),
            record.invoice_date.clone(),
            amount(record.net_amount),
            record.tax_rate.clone(),
            amount(record.tax_amount),
            amount(record.total_amount),
            record.currency.clone(),
            record.vendor_name.clone(),
            record.vendor_address.clone(),
            record.vendor_tax_id.clone(),
            record.filename.clone(),
            record.processing_errors.join("; "),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", record.filename));
    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    output.push_str(&format!("Date: {}\n", record.invoice_date));
    output.push('\n');

    output.push_str("Company:\n");
    output.push_str(&format!("  {}\n", record.our_company_name));
    if !record.our_tax_id.is_empty() {
        output.push_str(&format!("  Tax ID: {}\n", record.our_tax_id));
    }
    if !record.our_company_address.is_empty() {
        output.push_str(&format!("  {}\n", record.our_company_address));
    }
    output.push('\n');

    output.push_str("Vendor:\n");
    output.push_str(&format!("  {}\n", record.vendor_name));
    if !record.vendor_tax_id.is_empty() {
        output.push_str(&format!("  Tax ID: {}\n", record.vendor_tax_id));
    }
    if !record.vendor_address.is_empty() {
        output.push_str(&format!("  {}\n", record.vendor_address));
    }
    output.push('\n');

    output.push_str("Fees:\n");
    output.push_str(&format!("  Net:   {} {}\n", amount(record.net_amount), record.currency));
    output.push_str(&format!(
        "  Tax:   {} {} ({})\n",
        amount(record.tax_amount),
        record.currency,
        record.tax_rate
    ));
    output.push_str(&format!("  Total: {} {}\n", amount(record.total_amount), record.currency));

    if !record.processing_errors.is_empty() {
        output.push_str("\nErrors:\n");
        for error in &record.processing_errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }

    output
}
