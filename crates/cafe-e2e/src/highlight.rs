// Highlight - temporary red outline for headed and recorded runs
//
// The style is applied once the target is attached; its removal runs on a
// detached task that is not tied to the caller. Scenarios never wait for the
// removal and must not rely on it having happened.

use crate::error::{Error, Result};
use crate::locator::{ElementRef, RESOLVE_TARGETS};
use crate::session::PageSession;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long the outline stays on screen by default
pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(200);

const HIGHLIGHT_STYLE: &str = "0 0 0 4px rgba(255,0,0,0.9)";

const ATTACH_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn apply_script() -> String {
    format!(
        r#"(target) => {{
{RESOLVE_TARGETS}
  for (const el of found) {{
    if (!('cafeE2eShadow' in el.dataset)) el.dataset.cafeE2eShadow = el.style.boxShadow;
    el.style.boxShadow = '{HIGHLIGHT_STYLE}';
  }}
  return found.length;
}}"#
    )
}

fn revert_script() -> String {
    format!(
        r#"(target) => {{
{RESOLVE_TARGETS}
  for (const el of found) {{
    if (!('cafeE2eShadow' in el.dataset)) continue;
    el.style.boxShadow = el.dataset.cafeE2eShadow;
    delete el.dataset.cafeE2eShadow;
  }}
  return found.length;
}}"#
    )
}

/// Outlines `element` for `duration`, returning as soon as the outline is on.
///
/// Waits up to the session's navigation timeout for a match to be attached,
/// then fails with [`Error::ElementNotFound`]. The scheduled removal ignores
/// every error: the element may be gone, the page may have navigated, or the
/// session may be closed by then.
pub async fn highlight(
    element: &ElementRef,
    session: &PageSession,
    duration: Duration,
) -> Result<()> {
    let timeout = session.navigation_timeout();
    let start = Instant::now();
    let script = apply_script();

    let applied = loop {
        let applied: usize = session
            .page()
            .evaluate(&script, Some(element))
            .await
            .map_err(|source| Error::Action {
                action: "highlight".to_string(),
                element: element.name().to_string(),
                source,
            })?;
        if applied > 0 {
            break applied;
        }
        if start.elapsed() >= timeout {
            return Err(Error::ElementNotFound {
                element: element.name().to_string(),
                selector: element.to_playwright(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(ATTACH_POLL_INTERVAL).await;
    };
    debug!(element = %element, matched = applied, waited = ?start.elapsed(), "Highlighted");

    let page = session.page().clone();
    let target = element.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        match page
            .evaluate::<ElementRef, usize>(&revert_script(), Some(&target))
            .await
        {
            Ok(0) => debug!(element = %target, "Highlight target gone before revert"),
            Ok(_) => {}
            Err(e) => debug!(element = %target, error = %e, "Highlight revert skipped"),
        }
    });

    Ok(())
}

/// [`highlight`] with [`DEFAULT_HIGHLIGHT_DURATION`].
pub async fn flash(element: &ElementRef, session: &PageSession) -> Result<()> {
    highlight(element, session, DEFAULT_HIGHLIGHT_DURATION).await
}
