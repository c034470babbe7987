// Runner - executes scenarios across projects
//
// One Playwright server and one browser per project are shared by the run.
// Every attempt gets its own browser context, so nothing leaks between
// tests or retries. Concurrency is bounded by a semaphore sized from the
// configured worker count.

use crate::config::{Engine, Project, ReporterKind, RunConfig};
use crate::error::{Error, Result};
use crate::outcome::{Artifacts, AttemptRecord, RunSummary, TestOutcome};
use crate::report::{HtmlReporter, ListReporter, Reporter};
use crate::scenario::{Scenario, ScenarioContext};
use crate::session::{PageSession, SessionOptions};
use playwright_rs::{Browser, LaunchOptions, Playwright, Viewport};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const SCREENSHOT_FILE: &str = "test-finished.png";
const VIDEO_DIR: &str = "video";
const TRACE_FILE: &str = "trace.har";
const MAX_SLUG_LEN: usize = 60;

/// Awaits `fut`, failing with a test timeout once `timeout` elapses.
pub async fn with_test_timeout<T>(timeout: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::test_timeout(timeout)),
    }
}

/// Calls `attempt` with retry numbers 0, 1, ... until one passes or
/// `retries` extra attempts are used up.
pub async fn run_with_retries<F, Fut>(retries: u32, mut attempt: F) -> Vec<AttemptRecord>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptRecord>,
{
    let mut attempts = Vec::new();
    for retry in 0..=retries {
        let record = attempt(retry).await;
        let passed = record.passed;
        if !passed && retry < retries {
            warn!(
                retry = retry + 1,
                error = record.error.as_deref().unwrap_or_default(),
                "Attempt failed, retrying"
            );
        }
        attempts.push(record);
        if passed {
            break;
        }
    }
    attempts
}

/// Filesystem-safe name for a test title.
pub fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.truncate(MAX_SLUG_LEN);
    out.trim_end_matches('-').to_string()
}

/// Artifact directory of one attempt: `<slug>-<project>[-retryN]`.
pub fn artifact_dir(output_dir: &Path, scenario: &str, project: &str, retry: u32) -> PathBuf {
    let mut name = format!("{}-{}", slug(scenario), slug(project));
    if retry > 0 {
        name.push_str(&format!("-retry{retry}"));
    }
    output_dir.join(name)
}

/// One scenario on one project.
struct Job {
    index: usize,
    scenario: Scenario,
    project: Project,
    browser: Browser,
    config: Arc<RunConfig>,
}

impl Job {
    async fn run(self) -> TestOutcome {
        info!(scenario = self.scenario.name(), project = %self.project.name, "Test started");
        let attempts = run_with_retries(self.config.retries, |retry| self.attempt(retry)).await;
        TestOutcome::new(self.scenario.name(), self.project.name.clone(), attempts)
    }

    async fn attempt(&self, retry: u32) -> AttemptRecord {
        let config = &self.config;
        let dir = artifact_dir(&config.output_dir, self.scenario.name(), &self.project.name, retry);
        let record_video = config.video.records(retry);
        let record_trace = config.trace.records(retry);

        let mut options = SessionOptions::new(config.base_url.clone());
        options.navigation_timeout = config.navigation_timeout;
        options.viewport = Some(Viewport {
            width: config.viewport.width,
            height: config.viewport.height,
        });
        options.video_dir = record_video.then(|| dir.join(VIDEO_DIR));
        options.har_path = record_trace.then(|| dir.join(TRACE_FILE));

        let start = Instant::now();
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            return failed_attempt(retry, start, Error::from(e).context("creating artifact directory"));
        }
        let session = match PageSession::open(&self.browser, &options).await {
            Ok(session) => session,
            Err(e) => return failed_attempt(retry, start, e.context("opening browser context")),
        };

        let ctx = ScenarioContext::new(session);
        let result = with_test_timeout(config.timeout, self.scenario.run(&ctx)).await;
        let duration = start.elapsed();
        let passed = result.is_ok();
        let timed_out = matches!(result, Err(Error::TestTimeout { .. }));
        let (session, steps) = ctx.finish();

        let mut artifacts = Artifacts::default();
        if config.screenshot.takes(passed) {
            let path = dir.join(SCREENSHOT_FILE);
            match session.screenshot_to_file(&path).await {
                Ok(()) => artifacts.screenshot = Some(path),
                Err(e) => warn!(error = %e, "End-of-test screenshot failed"),
            }
        }

        // Closing the context flushes video and HAR to disk
        if let Err(e) = session.close().await {
            warn!(error = %e, "Closing browser context failed");
        }

        if record_video {
            let video = dir.join(VIDEO_DIR);
            if config.video.keeps(retry, passed) {
                artifacts.video_dir = Some(video);
            } else {
                discard(&video).await;
            }
        }
        if record_trace {
            let har = dir.join(TRACE_FILE);
            if config.trace.keeps(retry, passed) {
                artifacts.har = Some(har);
            } else {
                discard(&har).await;
            }
        }
        remove_if_empty(&dir).await;

        match &result {
            Ok(()) => debug!(retry, ?duration, "Attempt passed"),
            Err(e) => info!(retry, ?duration, error = %e, "Attempt failed"),
        }

        AttemptRecord {
            retry,
            passed,
            timed_out,
            duration,
            error: result.err().map(|e| e.to_string()),
            steps,
            artifacts,
        }
    }
}

fn failed_attempt(retry: u32, start: Instant, error: Error) -> AttemptRecord {
    AttemptRecord {
        retry,
        passed: false,
        timed_out: error.is_timeout(),
        duration: start.elapsed(),
        error: Some(error.to_string()),
        steps: Vec::new(),
        artifacts: Artifacts::default(),
    }
}

async fn discard(path: &Path) {
    let result = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
        Ok(_) => tokio::fs::remove_file(path).await,
        Err(_) => return,
    };
    if let Err(e) = result {
        debug!(path = %path.display(), error = %e, "Failed to discard artifact");
    }
}

async fn remove_if_empty(dir: &Path) {
    // remove_dir refuses non-empty directories
    let _ = tokio::fs::remove_dir(dir).await;
}

/// Drives a run: launches browsers, schedules tests, feeds reporters.
pub struct Runner {
    config: Arc<RunConfig>,
    reporters: Vec<Box<dyn Reporter>>,
}

impl Runner {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            reporters: Vec::new(),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Adds the reporters named in the configuration.
    pub fn with_configured_reporters(mut self) -> Self {
        for kind in self.config.reporters.clone() {
            self = match kind {
                ReporterKind::List => self.with_reporter(ListReporter::stdout()),
                ReporterKind::Html => {
                    let dir = self.config.report_dir.clone();
                    self.with_reporter(HtmlReporter::new(dir))
                }
            };
        }
        self
    }

    /// Runs the selected scenarios on every configured project.
    ///
    /// Test failures end up in the summary; an error means the run itself
    /// could not proceed.
    pub async fn run(&mut self, scenarios: Vec<Scenario>) -> Result<RunSummary> {
        let scenarios = self.config.select_scenarios(scenarios)?;
        let start = Instant::now();
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let playwright = Playwright::launch().await?;
        let mut browsers = Vec::new();
        for project in &self.config.projects {
            match launch_browser(&playwright, project, self.config.headless).await {
                Ok(browser) => browsers.push((project.clone(), browser)),
                Err(e) => {
                    close_browsers(&browsers).await;
                    let _ = playwright.shutdown().await;
                    return Err(e);
                }
            }
        }

        let total = scenarios.len() * browsers.len();
        for reporter in &mut self.reporters {
            reporter.on_begin(&self.config, total).await?;
        }
        info!(
            tests = total,
            workers = self.config.effective_workers(),
            "Starting run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.effective_workers()));
        let mut tasks = JoinSet::new();
        let mut index = 0;
        for (project, browser) in &browsers {
            for scenario in &scenarios {
                let job = Job {
                    index,
                    scenario: scenario.clone(),
                    project: project.clone(),
                    browser: browser.clone(),
                    config: Arc::clone(&self.config),
                };
                index += 1;
                let semaphore = Arc::clone(&semaphore);
                tasks.spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::Worker(e.to_string()))?;
                    let index = job.index;
                    Ok::<_, Error>((index, job.run().await))
                });
            }
        }

        let mut outcomes = Vec::with_capacity(total);
        let mut worker_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(|e| Error::Worker(e.to_string())).and_then(|r| r) {
                Ok((index, outcome)) => {
                    for reporter in &mut self.reporters {
                        if let Err(e) = reporter.on_test_end(&outcome).await {
                            warn!(error = %e, "Reporter failed");
                        }
                    }
                    outcomes.push((index, outcome));
                }
                Err(e) => {
                    error!(error = %e, "Test worker failed");
                    worker_error.get_or_insert(e);
                }
            }
        }

        close_browsers(&browsers).await;
        if let Err(e) = playwright.shutdown().await {
            warn!(error = %e, "Playwright shutdown failed");
        }

        if let Some(e) = worker_error {
            return Err(e);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let summary = RunSummary {
            outcomes: outcomes.into_iter().map(|(_, o)| o).collect(),
            duration: start.elapsed(),
        };
        for reporter in &mut self.reporters {
            reporter.on_end(&summary).await?;
        }
        info!(
            passed = summary.all_passed(),
            duration = ?summary.duration,
            "Run finished"
        );
        Ok(summary)
    }
}

async fn launch_browser(playwright: &Playwright, project: &Project, headless: bool) -> Result<Browser> {
    let browser_type = match project.engine {
        Engine::Chromium => playwright.chromium(),
        Engine::Firefox => playwright.firefox(),
        Engine::Webkit => playwright.webkit(),
    };
    debug!(project = %project.name, engine = project.engine.as_str(), headless, "Launching browser");
    browser_type
        .launch_with_options(LaunchOptions::new().headless(headless))
        .await
        .map_err(|e| Error::from(e).context(format!("launching {}", project.engine.as_str())))
}

async fn close_browsers(browsers: &[(Project, Browser)]) {
    for (project, browser) in browsers {
        if let Err(e) = browser.close().await {
            warn!(project = %project.name, error = %e, "Closing browser failed");
        }
    }
}
