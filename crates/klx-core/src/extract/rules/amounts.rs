//! Amount fields: net, tax, total and currency.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use super::patterns::{
    AMOUNT, AMOUNT_AFTER_PAREN, CURRENCY, NEGATIVE_AFTER_PAREN, NEGATIVE_AMOUNT,
    PERCENT_IN_PARENS, TRANSACTIONS_AMOUNT,
};
use crate::error::ExtractionError;
use crate::extract::company::OuCompany;
use crate::extract::lines::StatementLines;
use crate::models::record::InvoiceRecord;

/// Rate written for entities that are not charged tax on fees.
pub const ZERO_RATE: &str = "0%";

/// Parse a statement amount such as `1,234.56` or `-12.00`.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, ExtractionError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '-').collect();
    Decimal::from_str(&cleaned).map_err(|_| ExtractionError::Parse {
        field,
        value: raw.to_string(),
    })
}

pub fn apply_amount_rules(lines: &StatementLines<'_>, company: OuCompany, record: &mut InvoiceRecord) {
    if !company.is_supported() {
        return;
    }

    record.net_amount = collect(record, net_amount(lines, company));

    match company.fee_tax() {
        Some((keyword, default_rate)) => {
            let (rate, amount) = fee_tax(lines, keyword);
            record.tax_rate = rate.unwrap_or_else(|| default_rate.to_string());
            record.tax_amount = match amount {
                Some(result) => collect(record, Some(result)),
                None => Some(Decimal::ZERO),
            };
        }
        None => {
            record.tax_rate = ZERO_RATE.to_string();
            record.tax_amount = Some(Decimal::ZERO);
        }
    }

    record.total_amount = collect(record, total_amount(lines));

    if let Some(currency) = currency(lines) {
        record.currency = currency;
    }
}

/// Keep a parsed amount, or note the parse failure on the record.
fn collect(
    record: &mut InvoiceRecord,
    result: Option<Result<Decimal, ExtractionError>>,
) -> Option<Decimal> {
    match result? {
        Ok(amount) => Some(amount),
        Err(e) => {
            record.push_error(e.to_string());
            None
        }
    }
}

fn first_capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Net amount: the transactions figure on the fees line.
pub fn net_amount(
    lines: &StatementLines<'_>,
    company: OuCompany,
) -> Option<Result<Decimal, ExtractionError>> {
    let line = lines.first_containing(company.fees_keyword())?;
    first_capture(&TRANSACTIONS_AMOUNT, line).map(|raw| parse_amount("net_amount", raw))
}

/// Tax rate and amount from the first line carrying `keyword`.
///
/// Returns no amount when the keyword line is missing; the caller treats
/// that as zero tax.
pub fn fee_tax(
    lines: &StatementLines<'_>,
    keyword: &str,
) -> (Option<String>, Option<Result<Decimal, ExtractionError>>) {
    let Some(line) = lines.first_containing(keyword) else {
        return (None, None);
    };

    let rate = first_capture(&PERCENT_IN_PARENS, line).map(|r| r.trim().to_string());
    let amount = first_capture(&NEGATIVE_AFTER_PAREN, line)
        .or_else(|| first_capture(&AMOUNT_AFTER_PAREN, line))
        .map(|raw| parse_amount("tax_amount", raw));

    (rate, amount)
}

/// Total from the `Total costs and fees` line, sign dropped.
pub fn total_amount(lines: &StatementLines<'_>) -> Option<Result<Decimal, ExtractionError>> {
    let line = lines.first_containing("Total costs and fees")?;
    NEGATIVE_AMOUNT
        .find(line)
        .or_else(|| AMOUNT.find(line))
        .map(|m| parse_amount("total_amount", m.as_str()))
}

/// Currency code from the first `Payout` line that is not the date line.
pub fn currency(lines: &StatementLines<'_>) -> Option<String> {
    let line = lines
        .iter()
        .find(|line| line.contains("Payout") && !line.contains("Payout date"))?;
    CURRENCY.find(line).map(|m| m.as_str().to_string())
}
