//! Extracted payout statement records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields extracted from one payout statement.
///
/// Text fields default to empty strings and amounts to `None`; a record
/// counts as successful when `processing_errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Statement/invoice number.
    pub invoice_number: String,

    /// OU company name as printed on the statement.
    pub our_company_name: String,

    /// OU company address.
    pub our_company_address: String,

    /// OU company tax identifier (ABN, VAT ID, GST number).
    pub our_tax_id: String,

    /// Payout date as printed (`d MMM YYYY`).
    pub invoice_date: String,

    /// Transaction fees before tax.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub net_amount: Option<Decimal>,

    /// Tax rate as printed (e.g. `10.00%`).
    pub tax_rate: String,

    /// Tax charged on fees.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub tax_amount: Option<Decimal>,

    /// Total costs and fees, sign dropped.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,

    /// Payout currency (ISO 4217).
    pub currency: String,

    /// Vendor (Klarna entity) name.
    pub vendor_name: String,

    /// Vendor address.
    pub vendor_address: String,

    /// Vendor tax identifier.
    pub vendor_tax_id: String,

    /// Source text file name.
    pub filename: String,

    /// Problems met while extracting this record.
    #[serde(default)]
    pub processing_errors: Vec<String>,
}

impl InvoiceRecord {
    /// Create an empty record for the given OU name.
    pub fn for_company(name: impl Into<String>) -> Self {
        Self {
            our_company_name: name.into(),
            ..Self::default()
        }
    }

    /// Create a record describing a failure to read the source file.
    pub fn read_failure(filename: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self {
            our_company_name: "PROCESSING ERROR".to_string(),
            filename: filename.into(),
            processing_errors: vec![format!("failed to read file: {}", cause)],
            ..Self::default()
        }
    }

    /// Whether extraction finished without errors.
    pub fn is_success(&self) -> bool {
        self.processing_errors.is_empty()
    }

    /// Record an extraction problem.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.processing_errors.push(message.into());
    }
}

/// Success/failure counts over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
}

impl BatchSummary {
    /// Count successes and failures in `records`.
    pub fn from_records(records: &[InvoiceRecord]) -> Self {
        let successful_files = records.iter().filter(|r| r.is_success()).count();
        Self {
            total_files: records.len(),
            successful_files,
            failed_files: records.len() - successful_files,
        }
    }

    /// Add one record to the counts.
    pub fn add(&mut self, record: &InvoiceRecord) {
        self.total_files += 1;
        if record.is_success() {
            self.successful_files += 1;
        } else {
            self.failed_files += 1;
        }
    }
}
