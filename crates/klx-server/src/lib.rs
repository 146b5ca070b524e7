//! HTTP API for batch processing Klarna payout statements.
//!
//! Clients upload PDFs to `POST /api/process`, poll `GET /api/status` while
//! the batch runs in the background, and fetch the spreadsheet from
//! `GET /api/download`.

pub mod error;
pub mod server;

pub use error::{Error, Result};
pub use server::KlxServer;
pub use server::port::find_available_port;
pub use server::state::AppState;
pub use server::status::{JobState, JobStatus};
