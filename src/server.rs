// src/server.rs
//
// HTTP boundary: a single analysis endpoint plus a liveness probe. Any
// failure anywhere in the pipeline is reported as {"status": "error",
// "error": ...}; there are no error codes beyond success/error. Requests
// are independent — all shared state is immutable.

use crate::convert::Converter;
use crate::pipeline;
use crate::selector::SectionSelector;
use crate::storage::StorageManager;
use crate::utils::AppError;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    selector: Arc<SectionSelector>,
    converter: Arc<Converter>,
    storage: Arc<StorageManager>,
}

impl AppState {
    pub fn new(selector: SectionSelector, converter: Converter, storage: StorageManager) -> Self {
        Self {
            selector: Arc::new(selector),
            converter: Arc::new(converter),
            storage: Arc::new(storage),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeMetadata {
    pub original_path: String,
    pub extracted_pages: u32,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Success {
        status: &'static str,
        content: String,
        md_path: String,
        metadata: AnalyzeMetadata,
    },
    Error {
        status: &'static str,
        error: String,
    },
}

impl AnalyzeResponse {
    fn success(analysis: pipeline::FilingAnalysis) -> Self {
        Self::Success {
            status: "success",
            content: analysis.content,
            md_path: analysis.md_path.display().to_string(),
            metadata: AnalyzeMetadata {
                original_path: analysis.original_path.display().to_string(),
                extracted_pages: analysis.extracted_pages,
            },
        }
    }

    fn error(err: &AppError) -> Self {
        Self::Error {
            status: "error",
            error: err.to_string(),
        }
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    let result = pipeline::process_filing(
        Path::new(&request.path),
        &state.selector,
        &state.converter,
        &state.storage,
    )
    .await;

    match result {
        Ok(analysis) => {
            tracing::info!(
                path = %request.path,
                sections = analysis.selected_sections,
                "analysis complete"
            );
            Json(AnalyzeResponse::success(analysis))
        }
        Err(e) => {
            tracing::error!(path = %request.path, error = %e, "analysis failed");
            Json(AnalyzeResponse::error(&e))
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Runs the HTTP service until the process is stopped.
pub async fn serve(bind: SocketAddr, state: AppState) -> Result<(), AppError> {
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Listening on {}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn success_response_shape() {
        let response = AnalyzeResponse::success(pipeline::FilingAnalysis {
            content: "# 재무제표".to_string(),
            md_path: PathBuf::from("/out/filing.md"),
            original_path: PathBuf::from("/data/filing.pdf"),
            extracted_pages: 12,
            selected_sections: 3,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["content"], "# 재무제표");
        assert_eq!(json["md_path"], "/out/filing.md");
        assert_eq!(json["metadata"]["original_path"], "/data/filing.pdf");
        assert_eq!(json["metadata"]["extracted_pages"], 12);
    }

    #[test]
    fn error_response_shape() {
        let response = AnalyzeResponse::error(&AppError::Config("bad path".to_string()));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Configuration error: bad path");
        assert!(json.get("content").is_none());
    }
}
