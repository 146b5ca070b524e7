//! Application state for the HTTP server

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use klx_core::{
    InvoiceRecord, KlxConfig, PipelineObserver, PipelineOutcome, Stage, run_pipeline,
};
use parking_lot::RwLock;
use tracing::{error, info};

use super::status::JobStatus;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: KlxConfig,
    /// Progress of the current or last job
    status: RwLock<JobStatus>,
}

impl AppState {
    pub fn new(config: KlxConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                status: RwLock::new(JobStatus::default()),
            }),
        }
    }

    pub fn config(&self) -> &KlxConfig {
        &self.inner.config
    }

    pub fn upload_dir(&self) -> &Path {
        &self.inner.config.server.upload_dir
    }

    pub fn text_dir(&self) -> &Path {
        &self.inner.config.server.debug_txt_dir
    }

    pub fn output_file(&self) -> &Path {
        &self.inner.config.export.output_file
    }

    pub fn template_file(&self) -> &Path {
        &self.inner.config.export.template_file
    }

    pub fn frontend_dir(&self) -> Option<PathBuf> {
        let dir = &self.inner.config.server.frontend_dir;
        dir.is_dir().then(|| dir.clone())
    }

    /// Snapshot of the status record as served to clients.
    pub fn status(&self) -> JobStatus {
        self.inner.status.read().view()
    }

    /// Mark a new job as started. Returns `false` when one is already
    /// running.
    pub fn try_begin(&self) -> bool {
        let mut status = self.inner.status.write();
        if status.is_processing() {
            return false;
        }
        status.begin();
        true
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.inner.status.write().fail(message);
    }

    /// Run the batch pipeline over the upload folder. Blocks until done.
    ///
    /// The job always leaves the processing state, even when the pipeline
    /// panics.
    pub fn run_job(&self) {
        info!("Starting batch job over {}", self.upload_dir().display());
        self.finish_job(|| {
            run_pipeline(
                self.upload_dir(),
                self.text_dir(),
                self.output_file(),
                self.config(),
                self,
            )
        });
    }

    fn finish_job(&self, job: impl FnOnce() -> klx_core::Result<PipelineOutcome>) {
        let result = match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(result) => result,
            Err(_) => {
                error!("Batch job panicked");
                self.fail("Processing failed: internal error while processing files");
                return;
            }
        };

        match result {
            Ok(outcome) => {
                info!(
                    "Batch job completed: {} files, {} failed",
                    outcome.summary.total_files, outcome.summary.failed_files
                );
                self.inner.status.write().complete(&outcome);
            }
            Err(e) => {
                error!("Batch job failed: {}", e);
                self.fail(e.to_string());
            }
        }
    }
}

impl PipelineObserver for AppState {
    fn on_progress(&self, stage: Stage, current: usize, total: usize) {
        self.inner.status.write().update(stage, current, total);
    }

    fn on_record(&self, record: &InvoiceRecord) {
        let mut status = self.inner.status.write();
        status.push_record(record);
        tracing::debug!(
            "Live counts: total={}, success={}, fail={}",
            status.current_total,
            status.current_success,
            status.current_fail
        );
    }
}
