//! HTML to PDF (h2p) Library
//!
//! Renders HTML documents to PDF through a managed headless Chromium and
//! returns the bytes as base64 or gzip+base64.
//!
//! # Module Overview
//!
//! - [`browser`] - Browser lifecycle, launch resolution, CDP backend
//! - [`render`] - Per-request render with single crash retry
//! - [`output`] - Wire encoding of the PDF bytes
//! - [`handler`] - Request validation and response envelopes
//! - [`server`] - HTTP endpoints
//! - [`config`] - Configuration file support
//! - [`types`] - Request and response types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use h2p_lib::{BrowserManager, ChromiumBackend, ConvertRequest, Converter, LaunchOptions};
//! use h2p_lib::{PageWait, PdfRenderer};
//!
//! # async fn example() {
//! let manager = Arc::new(BrowserManager::new(
//!     Arc::new(ChromiumBackend),
//!     LaunchOptions::default(),
//! ));
//! let converter = Converter::new(Arc::new(PdfRenderer::new(manager, PageWait::default())));
//! let envelope = converter
//!     .handle(&ConvertRequest::new("<html><body><h1>Hi</h1></body></html>"))
//!     .await;
//! assert_eq!(envelope.status_code, 200);
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod handler;
pub mod output;
pub mod render;
pub mod server;
pub mod telemetry;
pub mod types;

pub use browser::{
    find_browser_executable, launch_args, Arch, BrowserBackend, BrowserManager, BrowserSession,
    BrowserState, ChromiumBackend, LaunchOptions, LaunchPlan, LiveBrowser, PageSession, PageWait,
    PdfLayout, Platform, DEFAULT_IDLE_THRESHOLD, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_NETWORK_IDLE_TIMEOUT,
};
pub use config::{Config, Timeouts, BROWSERS_PATH_ENV};
pub use error::{ErrorCategory, ErrorPayload, H2pError, Result};
pub use handler::{Converter, HTML_REQUIRED};
pub use output::{encode, encode_body};
pub use render::PdfRenderer;
pub use types::{ConvertRequest, OutputMode, ResponseEnvelope};
