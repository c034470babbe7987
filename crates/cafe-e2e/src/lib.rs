//! cafe-e2e: End-to-end browser suite for the cafe product listing
//!
//! Page objects, scenarios and a runner built on [`playwright_rs`].
//!
//! # Layout
//!
//! - [`locator`]: named element references, resolved lazily against a page
//! - [`session`]: a page plus its browser context, navigation and load-state waits
//! - [`pages`]: catalogs and facades for the cafe and product-list pages
//! - [`highlight`]: visual emphasis of an element before it is acted on
//! - [`assertions`]: sort-order checks and auto-retrying page expectations
//! - [`scenario`] / [`scenarios`]: journeys made of named steps
//! - [`runner`]: projects, workers, retries, timeouts and artifacts
//! - [`report`]: list and HTML reporters
//!
//! # Example
//!
//! ```ignore
//! use cafe_e2e::{RunConfig, Runner, scenarios};
//!
//! #[tokio::main]
//! async fn main() -> cafe_e2e::Result<()> {
//!     let config = RunConfig::from_env();
//!     let summary = Runner::new(config)?
//!         .with_configured_reporters()
//!         .run(scenarios::default_suite())
//!         .await?;
//!     std::process::exit(if summary.all_passed() { 0 } else { 1 });
//! }
//! ```

pub mod assertions;
pub mod config;
mod error;
pub mod highlight;
pub mod locator;
pub mod outcome;
pub mod pages;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod session;

// Re-export error types
pub use error::{Error, Result};

// Re-export the run surface
pub use config::{ArtifactMode, Engine, Project, ReporterKind, RunConfig, ScreenshotMode};
pub use outcome::{RunSummary, TestOutcome, TestStatus};
pub use runner::Runner;

// Re-export building blocks for writing scenarios
pub use locator::{ElementRef, Selector};
pub use pages::{CafePage, ProductListPage};
pub use scenario::{Scenario, ScenarioContext};
pub use session::{LoadState, PageSession, SessionOptions};
