use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum H2pError {
    #[error("{0}")]
    Validation(String),

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Target page, context or browser has been closed: {0}")]
    TargetClosed(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Encoding error: {0}")]
    Encoding(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl H2pError {
    pub fn validation(message: impl Into<String>) -> Self {
        H2pError::Validation(message.into())
    }

    pub fn launch(message: impl Into<String>) -> Self {
        H2pError::Launch(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        H2pError::Render(message.into())
    }

    /// Whether the failure means the browser connection is gone and a relaunch may help.
    pub fn is_target_closed(&self) -> bool {
        matches!(self, H2pError::TargetClosed(_))
    }

    /// HTTP-style status code used in response envelopes.
    pub fn status_code(&self) -> u16 {
        match self {
            H2pError::Validation(_) => 400,
            _ => 500,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            H2pError::Validation(msg) => ErrorPayload::new(
                ErrorCategory::Request,
                msg.to_string(),
                "Provide a non-empty HTML document in the request body.",
            ),
            H2pError::Launch(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("could not auto detect") || lower.contains("no such file") {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        self.to_string(),
                        "Install Chromium or point PLAYWRIGHT_BROWSERS_PATH / --chrome-path at a browser build.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        self.to_string(),
                        "Check that the Chromium binary starts in this environment; rerun with --verbose for launch diagnostics.",
                    )
                }
            }
            H2pError::TargetClosed(_) => ErrorPayload::new(
                ErrorCategory::Browser,
                self.to_string(),
                "The browser crashed twice in a row; check memory limits and retry the request.",
            ),
            H2pError::Render(msg) => {
                if msg.to_ascii_lowercase().contains("timed out") {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        self.to_string(),
                        "Try increasing --nav-timeout/--network-idle-timeout or remove slow external resources.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Render,
                        self.to_string(),
                        "Inspect the HTML input; rerun with --verbose for details.",
                    )
                }
            }
            H2pError::Encoding(e) => ErrorPayload::new(
                ErrorCategory::Encoding,
                e.to_string(),
                "Retry with --output-mode base64.",
            ),
            H2pError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            H2pError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON inputs; run with --verbose for details.",
            ),
            H2pError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check flags/paths (e.g., --port, --browsers-path) and the config file.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, H2pError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Request,
    Browser,
    Render,
    Encoding,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
