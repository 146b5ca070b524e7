//! Common regex patterns for payout statement extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Column separator in layout text.
pub const FIVE_SPACES: &str = "     ";

lazy_static! {
    // Our tax identifiers
    pub static ref ABN: Regex = Regex::new(r"ABN[:\s]+(\S+)").unwrap();

    pub static ref VAT_ID: Regex = Regex::new(r"VAT ID:\s*(\S+)").unwrap();

    pub static ref IE_VAT_ID: Regex = Regex::new(r"IE VAT ID:\s*(\S+)").unwrap();

    pub static ref US_VAT_ID: Regex = Regex::new(r"US\s*VAT ID:\s*(\S+)").unwrap();

    pub static ref GST_NUMBER: Regex = Regex::new(r"GST/HST/QST number:\s*(\S+)").unwrap();

    // Payout date, e.g. "Payout date: 15 Jan 2025"
    pub static ref PAYOUT_DATE: Regex = Regex::new(
        r"Payout date:\s*(\d{1,2}\s+[A-Za-z]{3}\s+\d{4})"
    ).unwrap();

    // Amounts
    pub static ref TRANSACTIONS_AMOUNT: Regex = Regex::new(
        r"Transactions[^0-9]*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref PERCENT_IN_PARENS: Regex = Regex::new(r"\(([^)]*%[^)]*)\)").unwrap();

    pub static ref NEGATIVE_AFTER_PAREN: Regex = Regex::new(r"\)[^-]*-([\d,]+\.\d{2})").unwrap();

    pub static ref AMOUNT_AFTER_PAREN: Regex = Regex::new(r"\)[^0-9-]*([\d,]+\.\d{2})").unwrap();

    pub static ref NEGATIVE_AMOUNT: Regex = Regex::new(r"-[\d,]+\.\d{2}").unwrap();

    pub static ref AMOUNT: Regex = Regex::new(r"[\d,]+\.\d{2}").unwrap();

    // ISO 4217 currency code
    pub static ref CURRENCY: Regex = Regex::new(r"\b[A-Z]{3}\b").unwrap();

    // Vendor tax identifiers
    pub static ref GB_VAT: Regex = Regex::new(r"(GB[^,\s]*)").unwrap();

    pub static ref CA_BUSINESS_NUMBER: Regex = Regex::new(r"number\s+(\d{9}\s+RT\d{4})").unwrap();

    pub static ref CA_BUSINESS_NUMBER_BARE: Regex = Regex::new(r"(\d{9}\s+RT\d{4})").unwrap();

    pub static ref LEADING_ALNUM: Regex = Regex::new(r"^(\d+[A-Za-z0-9\s]*)").unwrap();
}
