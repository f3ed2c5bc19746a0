//! Headless browser management for PDF export.
//!
//! # Module Structure
//!
//! - [`manager`] - Browser lifecycle (lazy launch, crash recovery, shutdown)
//! - [`launch`] - Launch argument and executable resolution
//! - [`session`] - Backend traits and page options
//! - [`chromium`] - chromiumoxide implementation of the backend traits
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use h2p_lib::{BrowserManager, ChromiumBackend, LaunchOptions};
//!
//! # async fn example() -> h2p_lib::Result<()> {
//! let manager = BrowserManager::new(Arc::new(ChromiumBackend), LaunchOptions::default());
//! let live = manager.ensure_ready().await?;
//! println!("browser generation {}", live.generation);
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod chromium;
mod launch;
mod manager;
mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use chromium::ChromiumBackend;
pub use launch::{
    find_browser_executable, launch_args, Arch, LaunchOptions, LaunchPlan, Platform,
};
pub use manager::{BrowserManager, BrowserState, LiveBrowser};
pub use session::{
    BrowserBackend, BrowserSession, PageSession, PageWait, PdfLayout, DEFAULT_IDLE_THRESHOLD,
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_NETWORK_IDLE_TIMEOUT,
};
