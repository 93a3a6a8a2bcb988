// src/convert/mod.rs
//
// Client for the external document-to-markdown converter service. The
// converter's configuration is fixed once at process start (OCR off,
// table-structure detection on) and shared across all requests; any
// retry or timeout policy beyond the request deadline belongs there,
// not here.

use crate::utils::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// Table-structure analysis on large filings is slow; give the converter
// a generous deadline before giving up on the request.
const CONVERT_TIMEOUT_SECS: u64 = 600;

/// Immutable converter pipeline configuration.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConverterOptions {
    pub do_ocr: bool,
    pub do_table_structure: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            do_ocr: false,
            do_table_structure: true, // keep table analysis
        }
    }
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    source_path: &'a str,
    options: ConverterOptions,
}

#[derive(Deserialize)]
struct ConvertResponse {
    content: String,
}

/// HTTP client for the converter endpoint.
pub struct Converter {
    endpoint: String,
    options: ConverterOptions,
    client: reqwest::Client,
}

impl Converter {
    pub fn new(endpoint: impl Into<String>, options: ConverterOptions) -> Result<Self, ConvertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(CONVERT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            options,
            client,
        })
    }

    /// Converts the PDF at `pdf_path` to markdown. The path must be
    /// reachable by the converter service (it runs co-located with this
    /// process).
    pub async fn convert(&self, pdf_path: &Path) -> Result<String, ConvertError> {
        let path_str = pdf_path.to_string_lossy();
        tracing::info!(path = %path_str, "requesting markdown conversion");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ConvertRequest {
                source_path: &path_str,
                options: self.options,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "converter returned error status");
            return Err(ConvertError::Http(status));
        }

        let body: ConvertResponse = response
            .json()
            .await
            .map_err(|e| ConvertError::Response(e.to_string()))?;

        tracing::debug!(bytes = body.content.len(), "conversion complete");
        Ok(body.content)
    }
}
