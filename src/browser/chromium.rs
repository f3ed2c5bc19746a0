//! Chromium backend built on chromiumoxide (CDP).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, EventLoadingFailed, EventLoadingFinished,
    EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::{Stream, StreamExt};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::launch::LaunchPlan;
use super::session::{BrowserBackend, BrowserSession, PageSession, PageWait, PdfLayout};
use crate::{H2pError, Result};

/// How long to wait for the child process to exit after close.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Protocol error code Chrome uses when a session id no longer resolves.
const SESSION_NOT_FOUND: i64 = -32001;

/// Map a CDP error into the crate taxonomy. Connection and channel loss mean
/// the browser (or its page) is gone, as do protocol errors for a closed
/// target or a detached session.
pub(crate) fn map_cdp_error(err: CdpError) -> H2pError {
    match &err {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            H2pError::TargetClosed(err.to_string())
        }
        CdpError::Chrome(protocol) if is_closed_target(protocol) => {
            H2pError::TargetClosed(err.to_string())
        }
        CdpError::Timeout => H2pError::render("browser request timed out"),
        _ => H2pError::render(err.to_string()),
    }
}

fn is_closed_target(err: &chromiumoxide::types::Error) -> bool {
    if err.code == SESSION_NOT_FOUND {
        return true;
    }
    let message = err.message.to_ascii_lowercase();
    message.contains("target closed")
        || message.contains("session with given id not found")
        || message.contains("no target with given id")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumBackend;

#[async_trait]
impl BrowserBackend for ChromiumBackend {
    async fn launch(&self, plan: &LaunchPlan) -> Result<Arc<dyn BrowserSession>> {
        let mut builder = BrowserConfig::builder()
            .args(plan.args.clone())
            .launch_timeout(plan.launch_timeout)
            .request_timeout(plan.request_timeout);
        if let Some(executable) = &plan.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(H2pError::launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| H2pError::launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    if matches!(err, CdpError::Ws(_)) {
                        debug!(error = %err, "CDP connection lost");
                        break;
                    }
                    debug!(error = %err, "CDP handler error");
                }
            }
            debug!("CDP handler finished");
        });

        Ok(Arc::new(ChromiumSession {
            browser: Arc::new(RwLock::new(browser)),
            handler_task: Mutex::new(Some(handler_task)),
        }))
    }
}

struct ChromiumSession {
    browser: Arc<RwLock<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self) -> Result<Box<dyn PageSession>> {
        let browser = self.browser.read().await;
        let context = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(map_cdp_error)?
            .result
            .browser_context_id;

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(H2pError::render)?;

        let page = match browser.new_page(params).await {
            Ok(page) => page,
            Err(err) => {
                if let Err(dispose_err) = browser
                    .execute(DisposeBrowserContextParams::new(context))
                    .await
                {
                    warn!(error = %dispose_err, "failed to dispose browser context");
                }
                return Err(map_cdp_error(err));
            }
        };

        Ok(Box::new(ChromiumPage {
            page: Some(page),
            context: Some(context),
            browser: Arc::clone(&self.browser),
        }))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.write().await;
        let result = browser.close().await.map(|_| ()).map_err(map_cdp_error);
        if timeout(REAP_TIMEOUT, browser.wait()).await.is_err() {
            warn!("browser process did not exit after close");
        }
        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }
        result
    }
}

struct ChromiumPage {
    page: Option<Page>,
    context: Option<BrowserContextId>,
    browser: Arc<RwLock<Browser>>,
}

impl ChromiumPage {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| H2pError::TargetClosed("page already closed".to_string()))
    }
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn load_html(&mut self, html: &str, wait: &PageWait) -> Result<()> {
        let page = self.page()?;
        page.execute(NetworkEnableParams::default())
            .await
            .map_err(map_cdp_error)?;

        // Subscribe before setting content so the first requests are seen.
        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(map_cdp_error)?
            .map(|e| NetworkActivity::Started(e.request_id.inner().clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(map_cdp_error)?
            .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(map_cdp_error)?
            .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));
        let activity = futures::stream::select_all([
            started.boxed(),
            finished.boxed(),
            failed.boxed(),
        ]);

        timeout(wait.navigation_timeout, page.set_content(html))
            .await
            .map_err(|_| {
                H2pError::render(format!(
                    "loading content timed out after {:?}",
                    wait.navigation_timeout
                ))
            })?
            .map_err(map_cdp_error)?;

        wait_for_network_idle(activity, wait).await
    }

    async fn print_pdf(&mut self, layout: &PdfLayout) -> Result<Vec<u8>> {
        let params = PrintToPdfParams {
            paper_width: Some(layout.paper_width),
            paper_height: Some(layout.paper_height),
            print_background: Some(layout.print_background),
            prefer_css_page_size: Some(layout.prefer_css_page_size),
            ..Default::default()
        };
        self.page()?.pdf(params).await.map_err(map_cdp_error)
    }

    async fn close(&mut self) -> Result<()> {
        let mut result = Ok(());
        if let Some(page) = self.page.take() {
            result = page.close().await.map_err(map_cdp_error);
        }
        if let Some(context) = self.context.take() {
            let browser = self.browser.read().await;
            let disposed = browser
                .execute(DisposeBrowserContextParams::new(context))
                .await;
            if let Err(err) = disposed {
                if result.is_ok() {
                    result = Err(map_cdp_error(err));
                }
            }
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NetworkActivity {
    Started(String),
    Settled(String),
}

/// Resolve once no request has been in flight for `wait.idle_threshold`.
pub(crate) async fn wait_for_network_idle<S>(mut activity: S, wait: &PageWait) -> Result<()>
where
    S: Stream<Item = NetworkActivity> + Unpin,
{
    let mut in_flight: HashSet<String> = HashSet::new();
    let deadline = tokio::time::sleep(wait.network_idle_timeout);
    tokio::pin!(deadline);

    loop {
        let quiet = tokio::time::sleep(wait.idle_threshold);
        tokio::select! {
            biased;
            _ = &mut deadline => {
                return Err(H2pError::render(format!(
                    "network idle wait timed out after {:?} with {} request(s) in flight",
                    wait.network_idle_timeout,
                    in_flight.len()
                )));
            }
            event = activity.next() => match event {
                Some(NetworkActivity::Started(id)) => {
                    in_flight.insert(id);
                }
                Some(NetworkActivity::Settled(id)) => {
                    in_flight.remove(&id);
                }
                None => {
                    return Err(H2pError::TargetClosed(
                        "page event stream ended".to_string(),
                    ));
                }
            },
            _ = quiet, if in_flight.is_empty() => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    fn wait() -> PageWait {
        PageWait {
            navigation_timeout: Duration::from_secs(30),
            network_idle_timeout: Duration::from_secs(10),
            idle_threshold: Duration::from_millis(500),
        }
    }

    #[test]
    fn connection_loss_is_target_closed() {
        assert!(map_cdp_error(CdpError::NoResponse).is_target_closed());
    }

    #[test]
    fn closed_target_protocol_errors_are_target_closed() {
        let closed = CdpError::Chrome(chromiumoxide::types::Error {
            code: -32000,
            message: "Target closed".to_string(),
        });
        assert!(map_cdp_error(closed).is_target_closed());

        let detached = CdpError::Chrome(chromiumoxide::types::Error {
            code: -32001,
            message: "Session with given id not found.".to_string(),
        });
        assert!(map_cdp_error(detached).is_target_closed());

        let bad_params = CdpError::Chrome(chromiumoxide::types::Error {
            code: -32602,
            message: "Invalid parameters".to_string(),
        });
        assert!(matches!(map_cdp_error(bad_params), H2pError::Render(_)));
    }

    #[test]
    fn other_cdp_errors_are_render_errors() {
        let err = map_cdp_error(CdpError::Timeout);
        assert!(!err.is_target_closed());
        assert!(err.to_string().contains("timed out"));

        let err = map_cdp_error(CdpError::NotFound);
        assert!(matches!(err, H2pError::Render(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_when_no_requests() {
        let (_tx, rx) = mpsc::unbounded::<NetworkActivity>();
        wait_for_network_idle(rx, &wait()).await.expect("idle");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_after_requests_settle() {
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(NetworkActivity::Started("1".into())).unwrap();
        tx.unbounded_send(NetworkActivity::Started("2".into())).unwrap();
        tx.unbounded_send(NetworkActivity::Settled("1".into())).unwrap();
        tx.unbounded_send(NetworkActivity::Settled("2".into())).unwrap();

        wait_for_network_idle(rx, &wait()).await.expect("idle");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_with_hanging_request() {
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(NetworkActivity::Started("slow".into()))
            .unwrap();

        let err = wait_for_network_idle(rx, &wait()).await.unwrap_err();
        assert!(err.to_string().contains("1 request(s) in flight"), "got: {err}");
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_event_stream_means_target_closed() {
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(NetworkActivity::Started("1".into())).unwrap();
        drop(tx);

        let err = wait_for_network_idle(rx, &wait()).await.unwrap_err();
        assert!(err.is_target_closed());
    }
}
