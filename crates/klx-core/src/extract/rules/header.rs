//! Statement header fields: invoice number, our company and payout date.

use tracing::trace;

use super::before;
use super::patterns::{ABN, FIVE_SPACES, GST_NUMBER, IE_VAT_ID, PAYOUT_DATE, US_VAT_ID, VAT_ID};
use crate::extract::company::OuCompany;
use crate::extract::lines::StatementLines;
use crate::models::record::InvoiceRecord;

const INVOICE_NUMBER_LINE: usize = 5;
const ADDRESS_LINE: usize = 9;
const DATE_LINE: usize = 10;

pub fn apply_header_rules(lines: &StatementLines<'_>, company: OuCompany, record: &mut InvoiceRecord) {
    if let Some(number) = invoice_number(lines) {
        record.invoice_number = number;
    }
    if let Some(address) = our_address(lines, company) {
        record.our_company_address = address;
    }
    if let Some(tax_id) = our_tax_id(lines, company) {
        record.our_tax_id = tax_id;
    }
    if let Some(date) = invoice_date(lines) {
        record.invoice_date = date;
    }
    trace!(
        "Header: number={:?} tax_id={:?} date={:?}",
        record.invoice_number,
        record.our_tax_id,
        record.invoice_date
    );
}

/// Invoice number: the right-most column of line 5.
pub fn invoice_number(lines: &StatementLines<'_>) -> Option<String> {
    let line = lines.line(INVOICE_NUMBER_LINE)?.trim();
    let number = match line.rfind(FIVE_SPACES) {
        Some(pos) => line[pos + FIVE_SPACES.len()..].trim(),
        None => line,
    };
    Some(number.to_string())
}

/// Our company address: line 9 up to the company's tax id marker.
pub fn our_address(lines: &StatementLines<'_>, company: OuCompany) -> Option<String> {
    let line = lines.line(ADDRESS_LINE)?.trim();
    let marker = match company {
        OuCompany::Ireland | OuCompany::StylesServices => ", IE VAT ID",
        OuCompany::Corporation => ", US VAT ID",
        OuCompany::UsServices => ", US  VAT ID",
        OuCompany::Canada => "GST/HST/QST number:",
        _ => FIVE_SPACES,
    };
    Some(before(line, marker).unwrap_or(line).to_string())
}

/// Our tax id. Australia and the UK entities print it anywhere in the
/// header; the rest print it on line 9.
pub fn our_tax_id(lines: &StatementLines<'_>, company: OuCompany) -> Option<String> {
    let (line, pattern) = match company {
        OuCompany::Australia => (lines.first_containing("ABN")?, &*ABN),
        OuCompany::Uk | OuCompany::Towers => (lines.first_containing("VAT ID:")?, &*VAT_ID),
        OuCompany::Ireland | OuCompany::StylesServices => (lines.line(ADDRESS_LINE)?, &*IE_VAT_ID),
        OuCompany::Corporation | OuCompany::UsServices => {
            (lines.line(ADDRESS_LINE)?, &*US_VAT_ID)
        }
        OuCompany::Canada => (lines.line(ADDRESS_LINE)?, &*GST_NUMBER),
        OuCompany::Unknown => return None,
    };

    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Payout date from line 10, as printed (`d MMM YYYY`).
pub fn invoice_date(lines: &StatementLines<'_>) -> Option<String> {
    PAYOUT_DATE
        .captures(lines.line(DATE_LINE)?)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
