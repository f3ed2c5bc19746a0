//! In-memory browser backend for lifecycle and render tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use super::launch::LaunchPlan;
use super::session::{BrowserBackend, BrowserSession, PageSession, PageWait, PdfLayout};
use crate::{H2pError, Result};

pub(crate) const FAKE_PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";

/// What the next page does when asked to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageOutcome {
    Succeed,
    CrashOnLoad,
    CrashOnOpen,
    FailRender,
}

#[derive(Default)]
struct Shared {
    outcomes: Mutex<VecDeque<PageOutcome>>,
    launch_failures: Mutex<VecDeque<String>>,
    fail_browser_close: Mutex<bool>,
    fail_page_close: Mutex<bool>,
    crash_barrier: Mutex<Option<Arc<Barrier>>>,
    launches: AtomicUsize,
    browser_closes: AtomicUsize,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    shared: Arc<Shared>,
}

impl FakeBackend {
    pub fn push_outcome(&self, outcome: PageOutcome) {
        self.shared.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn fail_next_launch(&self, message: &str) {
        self.shared
            .launch_failures
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    pub fn fail_browser_close(&self) {
        *self.shared.fail_browser_close.lock().unwrap() = true;
    }

    pub fn fail_page_close(&self) {
        *self.shared.fail_page_close.lock().unwrap() = true;
    }

    /// Hold each `CrashOnLoad` page until `parties` of them are loading at once.
    pub fn sync_crashes(&self, parties: usize) {
        *self.shared.crash_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
    }

    pub fn launch_count(&self) -> usize {
        self.shared.launches.load(Ordering::SeqCst)
    }

    pub fn browser_close_count(&self) -> usize {
        self.shared.browser_closes.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.shared.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.shared.pages_closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserBackend for FakeBackend {
    async fn launch(&self, _plan: &LaunchPlan) -> Result<Arc<dyn BrowserSession>> {
        if let Some(message) = self.shared.launch_failures.lock().unwrap().pop_front() {
            return Err(H2pError::launch(message));
        }
        self.shared.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeSession {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct FakeSession {
    shared: Arc<Shared>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self) -> Result<Box<dyn PageSession>> {
        let outcome = self
            .shared
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PageOutcome::Succeed);
        if outcome == PageOutcome::CrashOnOpen {
            return Err(H2pError::TargetClosed("browser has disconnected".into()));
        }
        self.shared.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            shared: Arc::clone(&self.shared),
            outcome,
            html: String::new(),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.shared.browser_closes.fetch_add(1, Ordering::SeqCst);
        if *self.shared.fail_browser_close.lock().unwrap() {
            return Err(H2pError::TargetClosed("already gone".into()));
        }
        Ok(())
    }
}

struct FakePage {
    shared: Arc<Shared>,
    outcome: PageOutcome,
    html: String,
}

#[async_trait]
impl PageSession for FakePage {
    async fn load_html(&mut self, html: &str, _wait: &PageWait) -> Result<()> {
        match self.outcome {
            PageOutcome::CrashOnLoad => {
                let barrier = self.shared.crash_barrier.lock().unwrap().clone();
                if let Some(barrier) = barrier {
                    barrier.wait().await;
                }
                Err(H2pError::TargetClosed("websocket closed".into()))
            }
            PageOutcome::FailRender => Err(H2pError::render("net::ERR_ABORTED")),
            _ => {
                self.html = html.to_string();
                Ok(())
            }
        }
    }

    async fn print_pdf(&mut self, _layout: &PdfLayout) -> Result<Vec<u8>> {
        let mut bytes = FAKE_PDF.to_vec();
        bytes.extend_from_slice(self.html.as_bytes());
        Ok(bytes)
    }

    async fn close(&mut self) -> Result<()> {
        self.shared.pages_closed.fetch_add(1, Ordering::SeqCst);
        if *self.shared.fail_page_close.lock().unwrap() {
            return Err(H2pError::TargetClosed("page already closed".into()));
        }
        Ok(())
    }
}
