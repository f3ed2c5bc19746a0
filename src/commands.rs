mod convert;
mod serve;

use std::sync::Arc;

use h2p_lib::{BrowserManager, ChromiumBackend, Config, Converter, PdfRenderer};

use crate::settings::{launch_options, page_wait};

pub use convert::run_convert;
pub use serve::run_serve;

/// Wire the Chromium-backed conversion stack for a resolved config.
fn build_converter(config: &Config) -> Converter {
    let manager = Arc::new(BrowserManager::new(
        Arc::new(ChromiumBackend),
        launch_options(config),
    ));
    Converter::new(Arc::new(PdfRenderer::new(manager, page_wait(config))))
}
