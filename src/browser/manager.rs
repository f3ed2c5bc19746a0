//! Browser manager owning the single long-lived browser process.
//!
//! The manager launches lazily, hands out shared handles, and replaces the
//! process when a render reports that the connection is gone. All state
//! transitions happen under one async mutex so at most one browser is live.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::launch::{LaunchOptions, LaunchPlan};
use super::session::{BrowserBackend, BrowserSession};
use crate::{H2pError, Result};

/// Lifecycle state of the managed browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserState {
    Uninitialized,
    Ready,
    Closed,
}

/// A launched browser plus the generation it was launched in.
#[derive(Clone)]
pub struct LiveBrowser {
    pub generation: u64,
    pub session: Arc<dyn BrowserSession>,
}

enum Slot {
    Uninitialized,
    Ready(LiveBrowser),
    Closed,
}

struct Inner {
    slot: Slot,
    launches: u64,
}

pub struct BrowserManager {
    backend: Arc<dyn BrowserBackend>,
    options: LaunchOptions,
    inner: Mutex<Inner>,
}

impl BrowserManager {
    pub fn new(backend: Arc<dyn BrowserBackend>, options: LaunchOptions) -> Self {
        Self {
            backend,
            options,
            inner: Mutex::new(Inner {
                slot: Slot::Uninitialized,
                launches: 0,
            }),
        }
    }

    pub async fn state(&self) -> BrowserState {
        match self.inner.lock().await.slot {
            Slot::Uninitialized => BrowserState::Uninitialized,
            Slot::Ready(_) => BrowserState::Ready,
            Slot::Closed => BrowserState::Closed,
        }
    }

    /// Return the live browser, launching one if needed.
    ///
    /// Launch failures are returned as-is; nothing is retried here.
    pub async fn ensure_ready(&self) -> Result<LiveBrowser> {
        let mut inner = self.inner.lock().await;
        self.ensure_ready_locked(&mut inner).await
    }

    /// Close the live browser, if any, and go back to `Uninitialized`.
    /// Close failures are logged, never returned.
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        Self::teardown_locked(&mut inner).await;
    }

    /// Replace the browser of `stale_generation` and return a live one.
    ///
    /// If another caller already replaced it, the current browser is reused
    /// instead of being torn down again.
    pub async fn recover(&self, stale_generation: u64) -> Result<LiveBrowser> {
        let mut inner = self.inner.lock().await;
        let is_stale = matches!(&inner.slot, Slot::Ready(live) if live.generation == stale_generation);
        if is_stale {
            Self::teardown_locked(&mut inner).await;
        }
        self.ensure_ready_locked(&mut inner).await
    }

    /// Tear down and refuse further launches.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        Self::teardown_locked(&mut inner).await;
        inner.slot = Slot::Closed;
        info!("browser manager shut down");
    }

    async fn ensure_ready_locked(&self, inner: &mut Inner) -> Result<LiveBrowser> {
        match &inner.slot {
            Slot::Ready(live) => return Ok(live.clone()),
            Slot::Closed => {
                return Err(H2pError::launch("browser manager has been shut down"));
            }
            Slot::Uninitialized => {}
        }

        info!(platform = %self.options.platform, "launching headless browser");
        let plan = LaunchPlan::resolve(&self.options);
        info!(
            executable = plan
                .executable
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<default discovery>".to_string()),
            args = ?plan.args,
            "resolved browser launch plan"
        );

        let session = self.backend.launch(&plan).await?;
        inner.launches += 1;
        let live = LiveBrowser {
            generation: inner.launches,
            session,
        };
        inner.slot = Slot::Ready(live.clone());
        info!(generation = live.generation, "browser ready");
        Ok(live)
    }

    async fn teardown_locked(inner: &mut Inner) {
        if !matches!(inner.slot, Slot::Ready(_)) {
            return;
        }
        if let Slot::Ready(live) = std::mem::replace(&mut inner.slot, Slot::Uninitialized) {
            info!(generation = live.generation, "closing browser");
            if let Err(err) = live.session.close().await {
                warn!(generation = live.generation, error = %err, "error closing browser");
            }
        }
    }
}
