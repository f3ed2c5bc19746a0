//! Backend seams between the lifecycle manager and a concrete browser driver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::launch::LaunchPlan;
use crate::Result;

/// Default timeout for loading page content.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for waiting for network idle state.
pub const DEFAULT_NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Quiet period after which the network counts as idle.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_millis(500);

/// How a page waits for its content to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWait {
    pub navigation_timeout: Duration,
    pub network_idle_timeout: Duration,
    pub idle_threshold: Duration,
}

impl Default for PageWait {
    fn default() -> Self {
        Self {
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            network_idle_timeout: DEFAULT_NETWORK_IDLE_TIMEOUT,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
        }
    }
}

/// Page layout for PDF export. Dimensions are in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfLayout {
    pub paper_width: f64,
    pub paper_height: f64,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

impl PdfLayout {
    /// A4 with backgrounds, ignoring author `@page` sizes.
    pub const fn a4() -> Self {
        Self {
            paper_width: 8.27,
            paper_height: 11.7,
            print_background: true,
            prefer_css_page_size: false,
        }
    }
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self::a4()
    }
}

/// Starts browser processes.
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    async fn launch(&self, plan: &LaunchPlan) -> Result<Arc<dyn BrowserSession>>;
}

/// A live browser process.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a fresh page in its own isolated context.
    async fn new_page(&self) -> Result<Box<dyn PageSession>>;

    async fn close(&self) -> Result<()>;
}

/// A single page. Callers must call [`PageSession::close`] exactly once.
#[async_trait]
pub trait PageSession: Send {
    /// Replace the document with `html` and block until the network is idle.
    async fn load_html(&mut self, html: &str, wait: &PageWait) -> Result<()>;

    async fn print_pdf(&mut self, layout: &PdfLayout) -> Result<Vec<u8>>;

    async fn close(&mut self) -> Result<()>;
}
