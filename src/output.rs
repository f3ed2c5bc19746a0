//! Output encoding of rendered PDF bytes.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, instrument};

use crate::types::{OutputMode, ResponseEnvelope};
use crate::H2pError;

/// Body used when an encoding failure carries no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Encode `bytes` for the wire. Failures become a 500 envelope.
pub fn encode(bytes: &[u8], mode: OutputMode) -> ResponseEnvelope {
    match encode_body(bytes, mode) {
        Ok(body) => ResponseEnvelope::ok(body),
        Err(err) => ResponseEnvelope::error(500, err.to_string(), UNKNOWN_ERROR),
    }
}

/// Encode `bytes` into the body string for `mode`.
#[instrument(skip_all, fields(mode = %mode, input_size = bytes.len(), output_size))]
pub fn encode_body(bytes: &[u8], mode: OutputMode) -> crate::Result<String> {
    let body = match mode {
        OutputMode::Base64 => STANDARD.encode(bytes),
        OutputMode::Compress => {
            let compressed = gzip(bytes).map_err(H2pError::Encoding)?;
            debug!(compressed_size = compressed.len(), "gzip finished");
            STANDARD.encode(compressed)
        }
    };
    tracing::Span::current().record("output_size", body.len());
    Ok(body)
}

fn gzip(input: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input)?;
    encoder.finish()
}
