//! Progress record of the current batch job.

use klx_core::{BatchSummary, InvoiceRecord, PipelineOutcome, Stage};
use serde::Serialize;

/// Lifecycle of a batch job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

/// Status record polled by the frontend. Reset at the start of every job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobStatus {
    pub status: JobState,
    pub step: String,
    pub progress: u8,
    pub error: Option<String>,
    pub result: Option<Vec<InvoiceRecord>>,
    pub summary: Option<BatchSummary>,
    pub processed_files: Vec<InvoiceRecord>,
    pub current_total: usize,
    pub current_success: usize,
    pub current_fail: usize,
}

impl JobStatus {
    pub fn is_processing(&self) -> bool {
        self.status == JobState::Processing
    }

    /// Start a new job, discarding everything from the previous one.
    pub fn begin(&mut self) {
        *self = JobStatus {
            status: JobState::Processing,
            step: "Converting PDFs to text...".to_string(),
            progress: 10,
            ..JobStatus::default()
        };
    }

    pub fn update(&mut self, stage: Stage, current: usize, total: usize) {
        self.progress = stage.percent(current, total);
        self.step = stage.describe(current, total);
    }

    /// Count a record as soon as it is extracted.
    pub fn push_record(&mut self, record: &InvoiceRecord) {
        self.current_total += 1;
        if record.is_success() {
            self.current_success += 1;
        } else {
            self.current_fail += 1;
        }
        self.processed_files.push(record.clone());
    }

    pub fn complete(&mut self, outcome: &PipelineOutcome) {
        self.status = JobState::Completed;
        self.step = "Completed".to_string();
        self.progress = 100;
        self.result = Some(outcome.records.clone());
        self.summary = Some(outcome.summary);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobState::Error;
        self.step = "Failed".to_string();
        self.error = Some(message.into());
    }

    /// The record as served to clients. While records are streaming in,
    /// they replace `result` and the live counters replace `summary`.
    pub fn view(&self) -> JobStatus {
        let mut view = self.clone();
        if !self.processed_files.is_empty() {
            view.result = Some(self.processed_files.clone());
            view.summary = Some(BatchSummary {
                total_files: self.current_total,
                successful_files: self.current_success,
                failed_files: self.current_fail,
            });
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn failed_record() -> InvoiceRecord {
        let mut record = InvoiceRecord::for_company("ACME");
        record.push_error("unsupported company: ACME");
        record
    }

    #[test]
    fn test_begin_resets_previous_job() {
        let mut status = JobStatus::default();
        status.push_record(&failed_record());
        status.fail("boom");

        status.begin();
        assert_eq!(status.status, JobState::Processing);
        assert_eq!(status.progress, 10);
        assert_eq!(status.error, None);
        assert!(status.processed_files.is_empty());
        assert_eq!(status.current_fail, 0);
    }

    #[test]
    fn test_view_uses_live_counters() {
        let mut status = JobStatus::default();
        status.begin();
        status.update(Stage::Extracting, 1, 2);
        status.push_record(&InvoiceRecord::for_company("SHEIN DISTRIBUTION UK LIMITED"));
        status.push_record(&failed_record());

        let view = status.view();
        assert_eq!(view.progress, 75);
        assert_eq!(view.step, "Extracting Data 1/2...");
        assert_eq!(view.result.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            view.summary,
            Some(BatchSummary { total_files: 2, successful_files: 1, failed_files: 1 })
        );
    }

    #[test]
    fn test_json_shape() {
        let mut status = JobStatus::default();
        status.fail("PDF conversion failed: no PDF files found in temp_uploads");

        let json = serde_json::to_value(status.view()).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["step"], "Failed");
        assert_eq!(json["result"], serde_json::Value::Null);
        assert_eq!(json["processed_files"], serde_json::json!([]));
        assert_eq!(json["current_total"], 0);
    }

    #[test]
    fn test_summary_is_camel_case() {
        let mut status = JobStatus::default();
        status.push_record(&failed_record());
        let json = serde_json::to_value(status.view()).unwrap();
        assert_eq!(json["summary"]["failedFiles"], 1);
        assert_eq!(json["summary"]["totalFiles"], 1);
    }
}
