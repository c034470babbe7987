// Test outcomes - what the runner hands to reporters

use crate::scenario::{StepRecord, StepStatus};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    /// Failed first, passed on a retry
    Flaky,
    Failed,
    /// Last attempt ran out of time
    TimedOut,
}

impl TestStatus {
    /// Decides the status from the attempts made, in order.
    pub fn from_attempts(attempts: &[AttemptRecord]) -> Self {
        match attempts.last() {
            Some(last) if last.passed && attempts.len() > 1 => TestStatus::Flaky,
            Some(last) if last.passed => TestStatus::Passed,
            Some(last) if last.timed_out => TestStatus::TimedOut,
            _ => TestStatus::Failed,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TestStatus::Passed | TestStatus::Flaky)
    }
}

/// Files an attempt left behind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Artifacts {
    pub screenshot: Option<PathBuf>,
    pub video_dir: Option<PathBuf>,
    pub har: Option<PathBuf>,
}

/// One run of a scenario, from a fresh session.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    /// 0 for the first run, 1 for the first retry, ...
    pub retry: u32,
    pub passed: bool,
    pub timed_out: bool,
    pub duration: Duration,
    pub error: Option<String>,
    pub steps: Vec<StepRecord>,
    pub artifacts: Artifacts,
}

impl AttemptRecord {
    /// Title of the step that failed, if a step failed.
    pub fn failed_step(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Failed)
            .map(|s| s.title.as_str())
    }
}

/// Final result of one scenario on one project.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub scenario: String,
    pub project: String,
    pub status: TestStatus,
    pub attempts: Vec<AttemptRecord>,
}

impl TestOutcome {
    pub fn new(scenario: impl Into<String>, project: impl Into<String>, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            scenario: scenario.into(),
            project: project.into(),
            status: TestStatus::from_attempts(&attempts),
            attempts,
        }
    }

    /// Time across all attempts
    pub fn duration(&self) -> Duration {
        self.attempts.iter().map(|a| a.duration).sum()
    }

    pub fn retries(&self) -> usize {
        self.attempts.len().saturating_sub(1)
    }

    pub fn last_attempt(&self) -> Option<&AttemptRecord> {
        self.attempts.last()
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<TestOutcome>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn count(&self, status: TestStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// True when no test failed (flaky tests count as passing).
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_ok())
    }
}
