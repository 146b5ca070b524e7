//! Field rules for payout statements.
//!
//! Each rule reads the statement lines for one group of fields and writes
//! what it finds into the record. Rules never fail; problems are pushed
//! onto the record's error list.

pub mod amounts;
pub mod header;
pub mod patterns;
pub mod vendor;

pub use amounts::{apply_amount_rules, parse_amount};
pub use header::apply_header_rules;
pub use vendor::apply_vendor_rules;

use super::company::OuCompany;
use super::lines::StatementLines;
use crate::models::record::InvoiceRecord;

/// Signature shared by the rule families.
pub type Rule = fn(&StatementLines<'_>, OuCompany, &mut InvoiceRecord);

/// Rule families in the order they run.
pub const RULES: [Rule; 3] = [apply_header_rules, apply_amount_rules, apply_vendor_rules];

/// Text before the first occurrence of `marker`, trimmed, or `None` when
/// the marker is absent.
pub(crate) fn before<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.find(marker).map(|pos| text[..pos].trim())
}

/// Text after the first occurrence of `marker` up to the next one (or the
/// end of the text), trimmed.
pub(crate) fn after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let end = rest.find(marker).unwrap_or(rest.len());
    Some(rest[..end].trim())
}
