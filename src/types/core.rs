//! Core request/response types.
//!
//! - [`ConvertRequest`] - HTML input plus the requested wire encoding
//! - [`OutputMode`] - base64 or gzip+base64
//! - [`ResponseEnvelope`] - `{statusCode, body}` result of every conversion

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wire encoding of the produced PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum OutputMode {
    /// Standard base64 of the PDF bytes.
    #[default]
    Base64,
    /// Base64 of the gzip-compressed PDF bytes.
    Compress,
}

impl From<&str> for OutputMode {
    /// Unrecognized values fall back to [`OutputMode::Base64`].
    fn from(value: &str) -> Self {
        match value {
            "compress" => OutputMode::Compress,
            _ => OutputMode::Base64,
        }
    }
}

impl From<String> for OutputMode {
    fn from(value: String) -> Self {
        OutputMode::from(value.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OutputMode::from(s))
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Base64 => f.write_str("base64"),
            OutputMode::Compress => f.write_str("compress"),
        }
    }
}

/// A single conversion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// HTML document to render. Missing and empty are both rejected.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<OutputMode>,
}

impl ConvertRequest {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            body: Some(html.into()),
            output_mode: None,
        }
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = Some(mode);
        self
    }

    /// The HTML body, if present and non-empty.
    pub fn html(&self) -> Option<&str> {
        self.body.as_deref().filter(|body| !body.is_empty())
    }

    pub fn mode(&self) -> OutputMode {
        self.output_mode.unwrap_or_default()
    }
}

/// The only externally visible conversion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
}

impl ResponseEnvelope {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    /// Build an error envelope, substituting `fallback` for an empty message.
    pub fn error(status_code: u16, message: impl Into<String>, fallback: &str) -> Self {
        let message = message.into();
        Self {
            status_code,
            body: if message.is_empty() {
                fallback.to_string()
            } else {
                message
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_camel_case() {
        let req: ConvertRequest =
            serde_json::from_str(r#"{"body":"<p>x</p>","outputMode":"compress"}"#).unwrap();
        assert_eq!(req.html(), Some("<p>x</p>"));
        assert_eq!(req.mode(), OutputMode::Compress);
    }

    #[test]
    fn unknown_output_mode_falls_back_to_base64() {
        let req: ConvertRequest =
            serde_json::from_str(r#"{"body":"<p>x</p>","outputMode":"zip"}"#).unwrap();
        assert_eq!(req.mode(), OutputMode::Base64);
        assert_eq!("brotli".parse::<OutputMode>().unwrap(), OutputMode::Base64);
    }

    #[test]
    fn missing_fields_default() {
        let req: ConvertRequest = serde_json::from_str("{}").unwrap();
        assert!(req.html().is_none());
        assert_eq!(req.mode(), OutputMode::Base64);

        let req: ConvertRequest = serde_json::from_str(r#"{"body":"","outputMode":null}"#).unwrap();
        assert!(req.html().is_none());
        assert_eq!(req.mode(), OutputMode::Base64);
    }

    #[test]
    fn envelope_serializes_status_code_camel_case() {
        let json = serde_json::to_string(&ResponseEnvelope::ok("abc".into())).unwrap();
        assert_eq!(json, r#"{"statusCode":200,"body":"abc"}"#);
    }

    #[test]
    fn envelope_error_uses_fallback_for_empty_message() {
        let env = ResponseEnvelope::error(500, "", "Unknown error");
        assert_eq!(env.body, "Unknown error");
        assert!(!env.is_success());
        assert_eq!(ResponseEnvelope::error(500, "boom", "Unknown error").body, "boom");
    }
}
