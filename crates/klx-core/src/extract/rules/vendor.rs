//! Vendor block: the line after `Need support`.

use super::patterns::{
    CA_BUSINESS_NUMBER, CA_BUSINESS_NUMBER_BARE, FIVE_SPACES, GB_VAT, LEADING_ALNUM,
};
use super::{after, before};
use crate::extract::company::OuCompany;
use crate::extract::lines::StatementLines;
use crate::models::record::InvoiceRecord;

pub const NEED_SUPPORT: &str = "Need support";
pub const MISSING_NEED_SUPPORT: &str = "'Need support' line not found";

pub fn apply_vendor_rules(lines: &StatementLines<'_>, company: OuCompany, record: &mut InvoiceRecord) {
    if !company.is_supported() {
        return;
    }

    let Some(anchor) = lines.position(NEED_SUPPORT) else {
        record.push_error(MISSING_NEED_SUPPORT);
        return;
    };
    let Some(vendor_line) = lines.get(anchor + 1) else {
        return;
    };
    let following = lines.get(anchor + 2);

    if let Some(name) = before(vendor_line, ",") {
        record.vendor_name = name.to_string();
    }
    if let Some(address) = vendor_address(vendor_line, company) {
        record.vendor_address = address;
    }
    if let Some(tax_id) = vendor_tax_id(vendor_line, following, company) {
        record.vendor_tax_id = tax_id;
    }
}

/// Address between the first comma and the company's tax id marker.
pub fn vendor_address(vendor_line: &str, company: OuCompany) -> Option<String> {
    let marker = company.vendor_marker()?;
    let comma = vendor_line.find(',')?;
    let end = vendor_line.find(marker)?;
    let start = comma + 1;
    if start > end {
        return Some(String::new());
    }
    Some(vendor_line[start..end].trim().to_string())
}

pub fn vendor_tax_id(
    vendor_line: &str,
    following: Option<&str>,
    company: OuCompany,
) -> Option<String> {
    match company {
        OuCompany::Australia => after(vendor_line, "ABN").map(str::to_string),
        OuCompany::Uk | OuCompany::Towers => Some(uk_vat_number(vendor_line, following)),
        OuCompany::Ireland | OuCompany::StylesServices => {
            registration_number(vendor_line, following)
        }
        OuCompany::Corporation | OuCompany::UsServices => {
            after(vendor_line, "• TIN").map(str::to_string)
        }
        OuCompany::Canada => following.map(|next| canadian_business_number(vendor_line, next)),
        OuCompany::Unknown => None,
    }
}

/// First `GB…` number after `VAT numbers`, else on the following line.
/// Other countries' numbers on the same line are skipped.
fn uk_vat_number(vendor_line: &str, following: Option<&str>) -> String {
    let same_line = vendor_line
        .find("VAT numbers")
        .and_then(|pos| GB_VAT.find(&vendor_line[pos..]))
        .map(|m| m.as_str().trim().to_string());

    same_line
        .or_else(|| following.and_then(|next| GB_VAT.find(next)).map(|m| m.as_str().trim().to_string()))
        .unwrap_or_default()
}

/// Irish registration numbers wrap onto the next line; join both parts.
fn registration_number(vendor_line: &str, following: Option<&str>) -> Option<String> {
    let head = after(vendor_line, "Registration number")?;
    let Some(next) = following else {
        return Some(String::new());
    };
    let next = next.trim();
    let tail = before(next, FIVE_SPACES).unwrap_or(next);
    Some(format!("{head}{tail}"))
}

/// Canadian business number, `123456789 RT0001`.
fn canadian_business_number(vendor_line: &str, next: &str) -> String {
    let found = first_group(&CA_BUSINESS_NUMBER, next)
        .or_else(|| {
            let rest = after(vendor_line, "number")?;
            let candidate = first_group(&LEADING_ALNUM, rest)?;
            let mixed = candidate.chars().any(|c| c.is_ascii_digit())
                && candidate.chars().any(|c| c.is_ascii_alphabetic());
            mixed.then_some(candidate)
        })
        .or_else(|| {
            [vendor_line, next]
                .into_iter()
                .find_map(|line| first_group(&CA_BUSINESS_NUMBER_BARE, line))
        });

    found
        .map(|id| id.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn first_group<'a>(pattern: &regex::Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}
