//! Template and result download endpoints

use std::path::Path;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download name used when the client does not pick one.
pub const DEFAULT_DOWNLOAD_NAME: &str = "extracted_invoices.xlsx";

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub filename: Option<String>,
}

/// GET /api/template - The configured export template
pub async fn download_template(State(state): State<AppState>) -> Result<Response> {
    let template = state.template_file();
    if !template.is_file() {
        return Err(Error::NotFound(format!(
            "Template file not found: {}",
            template.display()
        )));
    }

    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export_template.xlsx".to_string());
    send_xlsx(template, &name).await
}

/// GET /api/download - The spreadsheet produced by the last job
pub async fn download_result(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response> {
    let output = state.output_file();
    if !output.is_file() {
        return Err(Error::NotFound("File not found".to_string()));
    }

    let name = download_name(params.filename.as_deref());
    send_xlsx(output, &name).await
}

/// Requested download name with the `.xlsx` extension enforced.
pub fn download_name(requested: Option<&str>) -> String {
    let name = requested
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_DOWNLOAD_NAME)
        .replace(['"', '\\', '/', '\r', '\n'], "_");

    if name.ends_with(".xlsx") {
        name
    } else {
        format!("{}.xlsx", name)
    }
}

async fn send_xlsx(path: &Path, download_name: &str) -> Result<Response> {
    let data = tokio::fs::read(path).await?;
    let disposition = format!("attachment; filename=\"{}\"", download_name);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(None), "extracted_invoices.xlsx");
        assert_eq!(download_name(Some("")), "extracted_invoices.xlsx");
        assert_eq!(download_name(Some("march")), "march.xlsx");
        assert_eq!(download_name(Some("march.xlsx")), "march.xlsx");
        assert_eq!(download_name(Some("a\"b")), "a_b.xlsx");
    }
}
