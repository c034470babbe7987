// Error types for cafe-e2e

use std::time::Duration;
use thiserror::Error;

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can fail a scenario or a run
#[derive(Debug, Error)]
pub enum Error {
    /// Navigation did not complete
    ///
    /// The target was unreachable or the page did not finish loading inside
    /// the navigation budget.
    #[error("Failed to navigate to '{url}': {source}")]
    Navigation {
        url: String,
        #[source]
        source: playwright_rs::Error,
    },

    /// The page never reached the requested load state
    #[error("Timed out after {timeout_ms}ms waiting for load state '{state}'")]
    LoadStateTimeout { state: String, timeout_ms: u64 },

    /// An action or read on a catalog element failed
    ///
    /// Includes the catalog name of the element so the failing step can be
    /// traced back without reading selectors.
    #[error("Failed to {action} '{element}': {source}")]
    Action {
        action: String,
        element: String,
        #[source]
        source: playwright_rs::Error,
    },

    /// No element was attached within the wait budget
    #[error("Timed out after {timeout_ms}ms waiting for '{element}' to be attached: selector '{selector}'")]
    ElementNotFound {
        element: String,
        selector: String,
        timeout_ms: u64,
    },

    /// Observed page state did not match the expectation
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// The whole test exceeded the per-test timeout
    #[error("Test timeout of {timeout_ms}ms exceeded")]
    TestTimeout { timeout_ms: u64 },

    /// Error reported by the browser automation layer
    #[error("Browser error: {0}")]
    Browser(#[from] playwright_rs::Error),

    /// Base URL or navigation path could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A test task panicked or was cancelled
    #[error("Test worker failed: {0}")]
    Worker(String),

    /// Run configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    pub(crate) fn test_timeout(timeout: Duration) -> Self {
        Error::TestTimeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Returns true when the error came from an expired wait rather than a
    /// hard failure.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::LoadStateTimeout { .. }
            | Error::ElementNotFound { .. }
            | Error::TestTimeout { .. } => true,
            Error::Browser(e) => is_browser_timeout(e),
            Error::Navigation { source, .. } | Error::Action { source, .. } => {
                is_browser_timeout(source)
            }
            Error::Context(_, inner) => inner.is_timeout(),
            _ => false,
        }
    }
}

fn is_browser_timeout(error: &playwright_rs::Error) -> bool {
    matches!(
        error,
        playwright_rs::Error::Timeout(_)
            | playwright_rs::Error::NavigationTimeout { .. }
            | playwright_rs::Error::AssertionTimeout(_)
    )
}
