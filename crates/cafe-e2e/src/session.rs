// Page session - the live page a scenario drives
//
// Owns the browser context and page for one scenario attempt. Every
// ElementRef is resolved here, at the moment it is used, so nothing about a
// page survives the session that produced it.
//
// Waiting for load states after clicks: playwright-rs only offers
// WaitUntil::NetworkIdle on goto(). For clicks that trigger navigation or
// XHR refreshes the session polls page-side state instead: document
// readiness, an in-flight request counter installed by an init script, and
// the resource-timing entry count, which must hold still for a quiet window.

use crate::error::{Error, Result};
use crate::locator::{ElementRef, RESOLVE_TARGETS};
use playwright_rs::{
    Browser, BrowserContext, BrowserContextOptions, GotoOptions, Locator, Page, RecordHar,
    RecordVideo, Viewport, WaitUntil,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Default budget for navigation and load-state waits (matches Playwright)
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// No new requests for this long counts as network idle (matches Playwright)
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

const LOAD_STATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Counts fetch/XHR requests that have not settled yet.
const INFLIGHT_TRACKER_SCRIPT: &str = r#"(() => {
  if (window.__cafeE2e) return;
  const state = { inflight: 0 };
  window.__cafeE2e = state;
  if (window.fetch) {
    const originalFetch = window.fetch;
    window.fetch = function (...args) {
      state.inflight++;
      return originalFetch.apply(this, args).finally(() => { state.inflight--; });
    };
  }
  const originalSend = XMLHttpRequest.prototype.send;
  XMLHttpRequest.prototype.send = function (...args) {
    state.inflight++;
    this.addEventListener('loadend', () => { state.inflight--; }, { once: true });
    return originalSend.apply(this, args);
  };
})();"#;

const PAGE_STATE_SCRIPT: &str = r#"() => ({
  readyState: document.readyState,
  inflight: window.__cafeE2e ? window.__cafeE2e.inflight : 0,
  resources: performance.getEntriesByType('resource').length
})"#;

fn inner_texts_script() -> String {
    format!(
        r#"(target) => {{
{RESOLVE_TARGETS}
  return found.map((el) => el.innerText.trim());
}}"#
    )
}

/// Page lifecycle states a session can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    DomContentLoaded,
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageState {
    ready_state: String,
    inflight: i64,
    resources: u64,
}

/// Settings for a fresh session's browser context.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_url: String,
    pub viewport: Option<Viewport>,
    /// Directory to record the page video into
    pub video_dir: Option<PathBuf>,
    /// HAR file receiving the network trace
    pub har_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
}

impl SessionOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            viewport: None,
            video_dir: None,
            har_path: None,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }

    fn context_options(&self) -> BrowserContextOptions {
        let mut builder = BrowserContextOptions::builder();
        if let Some(viewport) = &self.viewport {
            builder = builder.viewport(viewport.clone());
        }
        if let Some(dir) = &self.video_dir {
            builder = builder.record_video(RecordVideo {
                dir: dir.to_string_lossy().into_owned(),
                size: self.viewport.clone(),
            });
        }
        if let Some(path) = &self.har_path {
            builder = builder.record_har(RecordHar {
                path: path.to_string_lossy().into_owned(),
                ..Default::default()
            });
        }
        builder.build()
    }
}

/// The live page a scenario runs against.
pub struct PageSession {
    page: Page,
    context: Option<BrowserContext>,
    base_url: Url,
    navigation_timeout: Duration,
}

impl PageSession {
    /// Opens a fresh browser context and page.
    pub async fn open(browser: &Browser, options: &SessionOptions) -> Result<Self> {
        let base_url = Url::parse(&options.base_url)?;
        let context = browser
            .new_context_with_options(options.context_options())
            .await?;
        context.add_init_script(INFLIGHT_TRACKER_SCRIPT).await?;
        let page = context.new_page().await?;
        debug!(base_url = %base_url, "Opened page session");

        Ok(Self {
            page,
            context: Some(context),
            base_url,
            navigation_timeout: options.navigation_timeout,
        })
    }

    /// Wraps a page created elsewhere. The caller keeps ownership of its context.
    pub async fn from_page(page: Page, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        page.add_init_script(INFLIGHT_TRACKER_SCRIPT).await?;
        Ok(Self {
            page,
            context: None,
            base_url,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Budget for navigation, load-state and attach waits
    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    /// Current page URL
    pub fn url(&self) -> String {
        self.page.url()
    }

    /// Resolves a path (or absolute URL) against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Navigates and waits until the network is idle.
    pub async fn goto(&self, path: &str) -> Result<()> {
        let url = self.url_for(path)?;
        let options = GotoOptions::new()
            .wait_until(WaitUntil::NetworkIdle)
            .timeout(self.navigation_timeout);

        let response = self
            .page
            .goto(url.as_str(), Some(options))
            .await
            .map_err(|source| Error::Navigation {
                url: url.to_string(),
                source,
            })?;

        match response {
            Some(response) if !response.ok() => {
                warn!(url = %url, status = response.status(), "Navigation returned an error status");
            }
            _ => debug!(url = %url, "Navigated"),
        }
        Ok(())
    }

    /// Resolves an element reference against the current page.
    pub async fn locator(&self, element: &ElementRef) -> Locator {
        let locator = self
            .page
            .locator(&element.selector().to_playwright())
            .await;
        match element.index() {
            Some(i) => locator.nth(i),
            None => locator,
        }
    }

    pub async fn click(&self, element: &ElementRef) -> Result<()> {
        debug!(element = %element, "Click");
        self.locator(element)
            .await
            .click(None)
            .await
            .map_err(|source| Error::Action {
                action: "click".to_string(),
                element: element.name().to_string(),
                source,
            })
    }

    pub async fn is_visible(&self, element: &ElementRef) -> Result<bool> {
        self.locator(element)
            .await
            .is_visible()
            .await
            .map_err(|source| Error::Action {
                action: "check visibility of".to_string(),
                element: element.name().to_string(),
                source,
            })
    }

    /// Inner text of every match, in DOM order, trimmed.
    ///
    /// One page-side read, so the result is a snapshot of a single DOM state.
    /// No match gives an empty list.
    pub async fn inner_texts(&self, element: &ElementRef) -> Result<Vec<String>> {
        self.page
            .evaluate(&inner_texts_script(), Some(element))
            .await
            .map_err(|source| Error::Action {
                action: "read text of".to_string(),
                element: element.name().to_string(),
                source,
            })
    }

    /// Waits for network idle within the navigation budget.
    pub async fn wait_for_network_idle(&self) -> Result<()> {
        self.wait_for_load_state(LoadState::NetworkIdle, self.navigation_timeout)
            .await
    }

    /// Polls page state until `state` holds or `timeout` expires.
    ///
    /// Evaluation errors while a navigation is replacing the document count
    /// as "not there yet".
    pub async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let mut quiet_since: Option<(Instant, u64)> = None;

        loop {
            match self
                .page
                .evaluate::<(), PageState>(PAGE_STATE_SCRIPT, None)
                .await
            {
                Ok(current) => {
                    let reached = match state {
                        LoadState::DomContentLoaded => current.ready_state != "loading",
                        LoadState::NetworkIdle => {
                            if current.ready_state == "complete" && current.inflight <= 0 {
                                match quiet_since {
                                    Some((since, resources)) if resources == current.resources => {
                                        since.elapsed() >= NETWORK_QUIET_WINDOW
                                    }
                                    _ => {
                                        quiet_since = Some((Instant::now(), current.resources));
                                        false
                                    }
                                }
                            } else {
                                quiet_since = None;
                                false
                            }
                        }
                    };
                    if reached {
                        debug!(state = state.as_str(), elapsed = ?start.elapsed(), "Load state reached");
                        return Ok(());
                    }
                }
                Err(e) => {
                    quiet_since = None;
                    debug!(state = state.as_str(), error = %e, "Page state unavailable");
                }
            }

            if start.elapsed() >= timeout {
                return Err(Error::LoadStateTimeout {
                    state: state.as_str().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }

            tokio::time::sleep(LOAD_STATE_POLL_INTERVAL).await;
        }
    }

    /// Viewport screenshot written to `path`.
    pub async fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        self.page.screenshot_to_file(path, None).await?;
        Ok(())
    }

    /// Closes the session's context (flushing video and HAR), or the page
    /// when the context belongs to someone else.
    pub async fn close(self) -> Result<()> {
        match self.context {
            Some(context) => context.close().await?,
            None => self.page.close().await?,
        }
        Ok(())
    }
}
