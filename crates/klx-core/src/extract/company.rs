//! OU company detection.

use serde::{Deserialize, Serialize};

use super::lines::StatementLines;
use super::rules::patterns::FIVE_SPACES;

/// Name used when line 8 does not carry a company name.
pub const UNKNOWN_COMPANY: &str = "UNKNOWN COMPANY";

/// The OU legal entities with their own statement layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OuCompany {
    /// SHEIN DISTRIBUTION AUSTRALIA PTY LIMITED
    Australia,
    /// SHEIN DISTRIBUTION UK LIMITED
    Uk,
    /// INFINITE STYLES ECOMMERCE CO., LIMITED
    Ireland,
    /// INFINITE TOWERS SERVICES LIMITED
    Towers,
    /// INFINITE STYLES SERVICES CO., LIMITED
    StylesServices,
    /// SHEIN DISTRIBUTION CORPORATION
    Corporation,
    /// SHEIN US Services, LLC
    UsServices,
    /// Shein Distribution Canada Limited
    Canada,
    /// Anything else.
    Unknown,
}

impl OuCompany {
    pub const SUPPORTED: [OuCompany; 8] = [
        OuCompany::Australia,
        OuCompany::Uk,
        OuCompany::Ireland,
        OuCompany::Towers,
        OuCompany::StylesServices,
        OuCompany::Corporation,
        OuCompany::UsServices,
        OuCompany::Canada,
    ];

    /// Classify an OU company name. The checks run in a fixed order and
    /// the first match wins.
    pub fn from_name(name: &str) -> Self {
        if name.contains("AUSTRALIA") {
            OuCompany::Australia
        } else if name.contains("UK") {
            OuCompany::Uk
        } else if name.contains("INFINITE STYLES ECOMMERCE") {
            OuCompany::Ireland
        } else if name.contains("INFINITE TOWERS") {
            OuCompany::Towers
        } else if name.contains("INFINITE STYLES SERVICES") {
            OuCompany::StylesServices
        } else if name.contains("SHEIN DISTRIBUTION CORPORATION") {
            OuCompany::Corporation
        } else if name.contains("SHEIN US Services") {
            OuCompany::UsServices
        } else if name.contains("Shein Distribution Canada") {
            OuCompany::Canada
        } else {
            OuCompany::Unknown
        }
    }

    /// Short code used in logs and JSON.
    pub fn code(&self) -> &'static str {
        match self {
            OuCompany::Australia => "AUSTRALIA",
            OuCompany::Uk => "UK",
            OuCompany::Ireland => "IRELAND",
            OuCompany::Towers => "TOWERS",
            OuCompany::StylesServices => "STYLES_SERVICES",
            OuCompany::Corporation => "CORPORATION",
            OuCompany::UsServices => "US_SERVICES",
            OuCompany::Canada => "CANADA",
            OuCompany::Unknown => "UNKNOWN",
        }
    }

    pub fn is_supported(&self) -> bool {
        *self != OuCompany::Unknown
    }

    /// Keyword identifying the transaction fees line.
    pub fn fees_keyword(&self) -> &'static str {
        match self {
            OuCompany::Australia
            | OuCompany::Uk
            | OuCompany::Towers
            | OuCompany::Ireland
            | OuCompany::StylesServices => "Fees 1",
            _ => "Fees ",
        }
    }

    /// Keyword and default rate for companies charged tax on fees.
    pub fn fee_tax(&self) -> Option<(&'static str, &'static str)> {
        match self {
            OuCompany::Australia => Some(("GST on fees", "10.00%")),
            OuCompany::Uk | OuCompany::Towers => Some(("VAT on fees", "20.00%")),
            _ => None,
        }
    }

    /// Marker that ends the vendor address on the vendor line.
    pub fn vendor_marker(&self) -> Option<&'static str> {
        match self {
            OuCompany::Australia => Some("• ABN"),
            OuCompany::Uk
            | OuCompany::Towers
            | OuCompany::Ireland
            | OuCompany::StylesServices => Some("• VAT numbers"),
            OuCompany::Corporation | OuCompany::UsServices => Some("• TIN"),
            OuCompany::Canada => Some("• GST/HST/QST"),
            OuCompany::Unknown => None,
        }
    }
}

impl std::fmt::Display for OuCompany {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Read the OU company name from line 8: the text before the first
/// five-space separator.
pub fn detect_company_name(lines: &StatementLines<'_>) -> String {
    lines
        .line(8)
        .map(str::trim)
        .filter(|line| line.contains(FIVE_SPACES))
        .and_then(|line| line.split(FIVE_SPACES).next())
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}
