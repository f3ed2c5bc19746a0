//! HTML to PDF render operation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::browser::{BrowserManager, LiveBrowser, PageSession, PageWait, PdfLayout};
use crate::{H2pError, Result};

/// Renders HTML through the managed browser, one isolated page per call.
pub struct PdfRenderer {
    manager: Arc<BrowserManager>,
    wait: PageWait,
    layout: PdfLayout,
}

impl PdfRenderer {
    pub fn new(manager: Arc<BrowserManager>, wait: PageWait) -> Self {
        Self {
            manager,
            wait,
            layout: PdfLayout::a4(),
        }
    }

    pub fn manager(&self) -> &Arc<BrowserManager> {
        &self.manager
    }

    /// Render `html` to PDF bytes.
    ///
    /// If the browser turns out to be gone, it is relaunched and the render
    /// is attempted exactly once more.
    pub async fn render(&self, html: &str) -> Result<Vec<u8>> {
        if html.is_empty() {
            return Err(H2pError::validation("HTML body is required"));
        }

        let live = self.manager.ensure_ready().await?;
        match self.render_on(&live, html).await {
            Err(err) if err.is_target_closed() => {
                warn!(
                    generation = live.generation,
                    error = %err,
                    "browser connection lost; relaunching and retrying once"
                );
                let fresh = self.manager.recover(live.generation).await?;
                self.render_on(&fresh, html).await
            }
            other => other,
        }
    }

    async fn render_on(&self, live: &LiveBrowser, html: &str) -> Result<Vec<u8>> {
        let mut guard = PageGuard::new(live.session.new_page().await?);
        let result = async {
            let page = guard.page()?;
            page.load_html(html, &self.wait).await?;
            page.print_pdf(&self.layout).await
        }
        .await;
        guard.release().await;

        if let Ok(bytes) = &result {
            debug!(generation = live.generation, bytes = bytes.len(), "rendered pdf");
        }
        result
    }
}

/// Owns an open page and closes it exactly once.
///
/// [`PageGuard::release`] is the normal path. If the owning future is
/// dropped first, `Drop` schedules the close on the current runtime.
pub(crate) struct PageGuard {
    page: Option<Box<dyn PageSession>>,
}

impl PageGuard {
    pub(crate) fn new(page: Box<dyn PageSession>) -> Self {
        Self { page: Some(page) }
    }

    pub(crate) fn page(&mut self) -> Result<&mut Box<dyn PageSession>> {
        self.page
            .as_mut()
            .ok_or_else(|| H2pError::TargetClosed("page already released".to_string()))
    }

    /// Close the page, logging (never returning) a close failure.
    pub(crate) async fn release(mut self) {
        if let Some(mut page) = self.page.take() {
            close_page(page.as_mut()).await;
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(mut page) = self.page.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move { close_page(page.as_mut()).await });
            } else {
                warn!("page dropped outside a runtime; it will close with the browser");
            }
        }
    }
}

async fn close_page(page: &mut dyn PageSession) {
    if let Err(err) = page.close().await {
        warn!(error = %err, "error closing page");
    }
}
