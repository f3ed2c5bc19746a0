//! Request handler: validation, render, encode, error envelope.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::output::encode;
use crate::render::PdfRenderer;
use crate::types::{ConvertRequest, ResponseEnvelope};
use crate::H2pError;

/// Body returned for a missing or empty HTML document.
pub const HTML_REQUIRED: &str = "HTML body is required";

/// Body used when a failure carries no message.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Entry point shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct Converter {
    renderer: Arc<PdfRenderer>,
}

impl Converter {
    pub fn new(renderer: Arc<PdfRenderer>) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &Arc<PdfRenderer> {
        &self.renderer
    }

    /// Handle one request. Never fails: every outcome is an envelope.
    pub async fn handle(&self, request: &ConvertRequest) -> ResponseEnvelope {
        let Some(html) = request.html() else {
            return ResponseEnvelope::error(400, HTML_REQUIRED, HTML_REQUIRED);
        };
        let mode = request.mode();
        let start = Instant::now();

        match self.renderer.render(html).await {
            Ok(pdf) => {
                let envelope = encode(&pdf, mode);
                info!(
                    %mode,
                    html_size = html.len(),
                    pdf_size = pdf.len(),
                    status = envelope.status_code,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "conversion finished"
                );
                envelope
            }
            Err(err) => {
                error!(error = %err, %mode, "error processing request");
                error_envelope(&err)
            }
        }
    }
}

fn error_envelope(err: &H2pError) -> ResponseEnvelope {
    ResponseEnvelope::error(err.status_code(), err.to_string(), INTERNAL_ERROR)
}
