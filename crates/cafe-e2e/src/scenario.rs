// Scenarios - named journeys made of ordered steps
//
// A scenario is a plain async function over a ScenarioContext. Each step is
// awaited in turn; the first failing step ends the scenario and its error is
// what the runner reports. Nothing is rolled back.

use crate::error::Result;
use crate::session::PageSession;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span};

/// Entry point of a scenario.
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, Result<()>>;

/// A named end-to-end journey.
#[derive(Clone)]
pub struct Scenario {
    name: &'static str,
    tags: &'static [&'static str],
    run: ScenarioFn,
}

impl Scenario {
    pub const fn new(name: &'static str, run: ScenarioFn) -> Self {
        Self {
            name,
            tags: &[],
            run,
        }
    }

    pub const fn with_tags(mut self, tags: &'static [&'static str]) -> Self {
        self.tags = tags;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }

    /// Runs the scenario body against `ctx`.
    pub fn run<'a>(&self, ctx: &'a ScenarioContext) -> BoxFuture<'a, Result<()>> {
        (self.run)(ctx)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub title: String,
    pub status: StepStatus,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Everything a scenario needs while it runs: its session and step log.
pub struct ScenarioContext {
    session: PageSession,
    steps: Mutex<Vec<StepRecord>>,
}

impl ScenarioContext {
    pub fn new(session: PageSession) -> Self {
        Self {
            session,
            steps: Mutex::new(Vec::new()),
        }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// Runs one named step and records how it went.
    ///
    /// The error is returned unchanged (wrapped with the step title) so `?`
    /// stops the scenario at the failing step.
    pub async fn step<T, F>(&self, title: &str, body: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let span = info_span!("step", title);
        let start = Instant::now();
        let result = body.instrument(span).await;
        let duration = start.elapsed();

        let (status, error) = match &result {
            Ok(_) => {
                info!(title, ?duration, "Step passed");
                (StepStatus::Passed, None)
            }
            Err(e) => {
                info!(title, ?duration, error = %e, "Step failed");
                (StepStatus::Failed, Some(e.to_string()))
            }
        };
        self.steps.lock().push(StepRecord {
            title: title.to_string(),
            status,
            duration,
            error,
        });

        result.map_err(|e| e.context(title))
    }

    /// Steps recorded so far, in execution order.
    pub fn steps(&self) -> Vec<StepRecord> {
        self.steps.lock().clone()
    }

    /// Ends the context, handing back the session for teardown.
    pub fn finish(self) -> (PageSession, Vec<StepRecord>) {
        (self.session, self.steps.into_inner())
    }
}
