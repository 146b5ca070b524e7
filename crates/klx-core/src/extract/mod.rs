//! Payout statement field extraction.

mod company;
mod folder;
mod lines;
mod parser;
pub mod rules;

pub use company::{OuCompany, UNKNOWN_COMPANY, detect_company_name};
pub use folder::extract_folder;
pub use lines::StatementLines;
pub use parser::{PayoutParser, StatementParser};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
