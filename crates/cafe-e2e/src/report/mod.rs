// Reporters - observers of a run
//
// The runner calls on_begin once, on_test_end as each test settles (in
// completion order), and on_end with the sorted summary.

pub mod html;
pub mod list;

pub use html::HtmlReporter;
pub use list::ListReporter;

use crate::config::RunConfig;
use crate::error::Result;
use crate::outcome::{RunSummary, TestOutcome};
use async_trait::async_trait;

#[async_trait]
pub trait Reporter: Send {
    /// Called before any test starts. `total` counts scenario/project pairs.
    async fn on_begin(&mut self, config: &RunConfig, total: usize) -> Result<()>;

    async fn on_test_end(&mut self, outcome: &TestOutcome) -> Result<()>;

    async fn on_end(&mut self, summary: &RunSummary) -> Result<()>;
}

/// Seconds with one decimal, as reporters print durations.
pub(crate) fn format_duration(d: std::time::Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}
