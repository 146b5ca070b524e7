//! Upload and job start endpoint

use std::path::Path;

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Name of the multipart field carrying the PDFs.
const FILES_FIELD: &str = "files";

/// Response from a started job
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub status: String,
}

/// POST /api/process - Store uploaded PDFs and start the batch job
pub async fn process_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        // Keep the base name only; browsers may send relative paths.
        let Some(filename) = field.file_name().and_then(base_name) else {
            tracing::warn!("Skipping upload without a usable file name");
            continue;
        };
        let data = field.bytes().await?;
        tracing::debug!("Received {} ({} bytes)", filename, data.len());
        files.push((filename, data));
    }

    if files.is_empty() {
        return Err(Error::BadRequest("No files provided".to_string()));
    }

    if !state.try_begin() {
        return Err(Error::Busy);
    }

    if let Err(e) = store_uploads(state.upload_dir(), &files).await {
        let message = format!("Failed to start processing: {}", e);
        state.fail(message.clone());
        return Err(Error::Internal(message));
    }

    tracing::info!("Stored {} uploads, starting batch job", files.len());
    let worker = state.clone();
    tokio::task::spawn_blocking(move || worker.run_job());

    Ok(Json(ProcessResponse {
        message: "Processing started".to_string(),
        status: "processing".to_string(),
    }))
}

fn base_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    (!base.is_empty() && base != "." && base != "..").then(|| base.to_string())
}

/// Empty the upload folder and write the new files into it.
async fn store_uploads(dir: &Path, files: &[(String, axum::body::Bytes)]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Could not remove old upload {}: {}", path.display(), e);
            }
        }
    }

    for (name, data) in files {
        tokio::fs::write(dir.join(name), data).await?;
    }
    Ok(())
}
