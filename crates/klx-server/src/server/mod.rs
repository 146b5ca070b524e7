//! HTTP server for uploading statements and polling batch progress

pub mod port;
pub mod routes;
pub mod state;
pub mod status;

use std::net::SocketAddr;

use axum::{Router, routing::get};
use klx_core::KlxConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::error::{Error, Result};
use port::find_available_port;
use state::AppState;

/// Statement processing HTTP server
pub struct KlxServer {
    config: KlxConfig,
    state: AppState,
}

impl KlxServer {
    pub fn new(config: KlxConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let mut router = Router::new()
            .route("/health", get(health_check))
            .nest("/api", routes::api_routes(self.config.server.max_upload_size))
            .with_state(self.state.clone());

        if let Some(dir) = self.state.frontend_dir() {
            tracing::info!("Serving frontend from {}", dir.display());
            router = router.fallback_service(ServeDir::new(dir));
        }

        router.layer(TraceLayer::new_for_http()).layer(cors)
    }

    /// Bind the configured port, or the next free one up to
    /// `port_range_end`, and serve until the process stops.
    pub async fn start(self) -> Result<()> {
        let server = &self.config.server;
        for dir in [&server.upload_dir, &server.debug_txt_dir] {
            tokio::fs::create_dir_all(dir).await?;
        }

        let port = find_available_port(&server.host, server.port, server.port_range_end)
            .ok_or_else(|| {
                Error::Config(format!(
                    "No available port between {} and {}",
                    server.port, server.port_range_end
                ))
            })?;
        if port != server.port {
            tracing::warn!("Port {} is busy, using {}", server.port, port);
        }

        let addr: SocketAddr = format!("{}:{}", server.host, port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        tracing::info!("Listening on http://{}", addr);
        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::path::Path;
    use tower::ServiceExt;

    fn config(root: &Path) -> KlxConfig {
        let mut config = KlxConfig::default();
        config.server.upload_dir = root.join("uploads");
        config.server.debug_txt_dir = root.join("debug_txt");
        config.server.frontend_dir = root.join("frontend");
        config.export.output_file = root.join("out.xlsx");
        config.export.template_file = root.join("template.xlsx");
        config
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_body(boundary: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, data) in files {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                    name
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        body
    }

    fn upload_request(files: &[(&str, &[u8])]) -> Request<Body> {
        let boundary = "klxboundary";
        Request::builder()
            .method("POST")
            .uri("/api/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(multipart_body(boundary, files)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = KlxServer::new(config(dir.path())).build_router();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_initial_status_is_idle() {
        let dir = tempfile::tempdir().unwrap();
        let app = KlxServer::new(config(dir.path())).build_router();

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "idle");
        assert_eq!(json["progress"], 0);
        assert_eq!(json["error"], Value::Null);
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = KlxServer::new(config(dir.path())).build_router();

        let response = app
            .oneshot(Request::builder().uri("/api/download").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "File not found");
    }

    #[tokio::test]
    async fn test_download_sets_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out.xlsx"), b"xlsx bytes").unwrap();
        let app = KlxServer::new(config(dir.path())).build_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/download?filename=march")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"march.xlsx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"xlsx bytes");
    }

    #[tokio::test]
    async fn test_template_missing() {
        let dir = tempfile::tempdir().unwrap();
        let app = KlxServer::new(config(dir.path())).build_router();

        let response = app
            .oneshot(Request::builder().uri("/api/template").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = body_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Template file not found:"));
    }

    #[tokio::test]
    async fn test_process_rejects_second_job() {
        let dir = tempfile::tempdir().unwrap();
        let server = KlxServer::new(config(dir.path()));
        assert!(server.state().try_begin());
        let app = server.build_router();

        let response = app
            .oneshot(upload_request(&[("a.pdf", b"%PDF-1.4")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["error"],
            "Already processing files. Please wait."
        );
    }

    #[tokio::test]
    async fn test_process_stores_uploads_and_starts_job() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        std::fs::create_dir_all(&uploads).unwrap();
        std::fs::write(uploads.join("old.pdf"), b"stale").unwrap();

        let server = KlxServer::new(config(dir.path()));
        let state = server.state().clone();
        let app = server.build_router();

        let response = app
            .oneshot(upload_request(&[("nested/a.pdf", b"not a real pdf")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Processing started");
        assert_eq!(json["status"], "processing");

        assert!(!uploads.join("old.pdf").exists());
        assert_eq!(std::fs::read(uploads.join("a.pdf")).unwrap(), b"not a real pdf");

        // The only upload is not a PDF, so the job ends in an error.
        for _ in 0..200 {
            if !state.status().is_processing() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let status = state.status();
        assert_eq!(status.status, crate::JobState::Error);
        assert!(status.error.unwrap().starts_with("PDF conversion failed"));
    }

    #[tokio::test]
    async fn test_process_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = KlxServer::new(config(dir.path())).build_router();

        let response = app.oneshot(upload_request(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
