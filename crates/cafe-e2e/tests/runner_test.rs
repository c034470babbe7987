// Integration tests for the Runner
//
// Runs the scenario catalogue against the fixture storefront on Chromium.
//
// Tests cover:
// - The default suite passing end to end
// - Retries: flaky and failing scenarios, one fresh context per attempt
// - Artifact retention per mode, HTML/JSON report output
// - Per-test timeout
// - Archived scenarios opt-in with grep

mod common;

use cafe_e2e::assertions::expect_text;
use cafe_e2e::config::ViewportSize;
use cafe_e2e::pages::cafe::catalog;
use cafe_e2e::report::{HtmlReporter, ListReporter};
use cafe_e2e::scenario::StepStatus;
use cafe_e2e::{
    ArtifactMode, CafePage, Engine, Error, Project, RunConfig, Runner, Scenario, ScenarioContext,
    ScreenshotMode, TestStatus, scenarios,
};
use fixture_server::FixtureServer;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const FLAKY: &str = "flaky cafe check";
const FAILING: &str = "cafe lists a product it does not sell";
const SLOW: &str = "scenario slower than its budget";

static FLAKY_CALLS: AtomicU32 = AtomicU32::new(0);

async fn flaky(ctx: &ScenarioContext) -> cafe_e2e::Result<()> {
    ctx.step("Open the cafe listing", CafePage::new(ctx.session()).open())
        .await?;
    ctx.step("Fail on the first attempt only", async {
        if FLAKY_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(Error::AssertionFailed("first attempt".to_string()))
        } else {
            Ok(())
        }
    })
    .await
}

async fn failing(ctx: &ScenarioContext) -> cafe_e2e::Result<()> {
    let session = ctx.session();
    ctx.step("Open the cafe listing", CafePage::new(session).open())
        .await?;
    ctx.step("Expect a product that is not listed", async {
        expect_text(
            session,
            &catalog::product_names().first(),
            "Not On The Menu",
            Duration::from_secs(1),
        )
        .await
    })
    .await
}

async fn slow(ctx: &ScenarioContext) -> cafe_e2e::Result<()> {
    ctx.step("Wait longer than the test budget", async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    })
    .await
}

/// Collects list reporter output for assertions.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn fixture_config(base_url: String, dir: &Path) -> RunConfig {
    RunConfig {
        base_url,
        projects: vec![Project::new("chromium", Engine::Chromium, "Desktop Chrome")],
        workers: 2,
        retries: 1,
        timeout: Duration::from_secs(60),
        viewport: ViewportSize {
            width: 1280,
            height: 720,
        },
        screenshot: ScreenshotMode::OnlyOnFailure,
        video: ArtifactMode::Off,
        trace: ArtifactMode::RetainOnFailure,
        output_dir: dir.join("test-results"),
        report_dir: dir.join("report"),
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn test_run_default_suite_with_retries_and_reports() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = fixture_config(server.url(), dir.path());
    let report_dir = config.report_dir.clone();

    let mut suite = scenarios::default_suite();
    suite.push(Scenario::new(FLAKY, |ctx| Box::pin(flaky(ctx))));
    suite.push(Scenario::new(FAILING, |ctx| Box::pin(failing(ctx))));

    let output = SharedBuffer::default();
    let summary = Runner::new(config)
        .expect("Invalid config")
        .with_reporter(ListReporter::new(output.clone()))
        .with_reporter(HtmlReporter::new(&report_dir))
        .run(suite)
        .await
        .expect("Run failed");

    let names: Vec<_> = summary.outcomes.iter().map(|o| o.scenario.as_str()).collect();
    assert_eq!(
        names,
        [
            scenarios::sort_pagination::NAME,
            scenarios::sort_by_name::DESCENDING_NAME,
            scenarios::sort_by_name::BOTH_DIRECTIONS_NAME,
            FLAKY,
            FAILING,
        ]
    );
    for outcome in &summary.outcomes[..3] {
        assert_eq!(
            outcome.status,
            TestStatus::Passed,
            "{} failed: {:?}",
            outcome.scenario,
            outcome.last_attempt().and_then(|a| a.error.clone())
        );
        assert!(outcome.attempts[0].artifacts.screenshot.is_none());
        assert!(outcome.attempts[0].artifacts.har.is_none());
    }
    let tcx2 = &summary.outcomes[0].attempts[0];
    assert_eq!(tcx2.steps.len(), 5);
    assert!(tcx2.steps.iter().all(|s| s.status == StepStatus::Passed));

    let flaky = &summary.outcomes[3];
    assert_eq!(flaky.status, TestStatus::Flaky);
    assert_eq!(flaky.attempts.len(), 2);
    let first = &flaky.attempts[0];
    assert_eq!(first.failed_step(), Some("Fail on the first attempt only"));
    let har = first.artifacts.har.as_ref().expect("Failing attempt keeps its HAR");
    assert!(har.exists());
    assert!(har.to_string_lossy().contains("flaky-cafe-check-chromium"));
    assert!(first.artifacts.screenshot.as_ref().is_some_and(|p| p.exists()));
    assert!(flaky.attempts[1].artifacts.har.is_none());

    let failed = &summary.outcomes[4];
    assert_eq!(failed.status, TestStatus::Failed);
    assert_eq!(failed.attempts.len(), 2);
    let error = failed.attempts[1].error.as_deref().unwrap_or_default();
    assert!(error.starts_with("Expect a product that is not listed"), "{error}");
    assert!(
        failed.attempts[1]
            .artifacts
            .har
            .as_ref()
            .is_some_and(|p| p.to_string_lossy().contains("-retry1"))
    );
    assert!(!summary.all_passed());

    let text = output.text();
    assert!(text.contains("Running 5 tests using 2 workers"));
    assert!(text.contains("±"));
    assert!(text.contains(&format!("[chromium] › {FAILING}")));
    assert!(text.contains("  1 failed"));
    assert!(text.contains("  1 flaky"));
    assert!(text.contains("  3 passed"));

    let index = std::fs::read_to_string(report_dir.join("index.html")).expect("No HTML report");
    assert!(index.contains("data:image/png;base64,"));
    assert!(index.contains(FAILING));
    let results: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(report_dir.join("results.json")).expect("No JSON results"),
    )
    .expect("Invalid JSON results");
    assert_eq!(results["outcomes"][3]["status"], "flaky");

    server.shutdown();
}

#[tokio::test]
async fn test_run_times_out_slow_scenario() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = fixture_config(server.url(), dir.path());
    config.timeout = Duration::from_secs(2);
    config.retries = 0;
    config.trace = ArtifactMode::Off;
    config.screenshot = ScreenshotMode::Off;

    let summary = Runner::new(config)
        .expect("Invalid config")
        .run(vec![Scenario::new(SLOW, |ctx| Box::pin(slow(ctx)))])
        .await
        .expect("Run failed");

    assert_eq!(summary.outcomes.len(), 1);
    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.status, TestStatus::TimedOut);
    assert_eq!(outcome.attempts.len(), 1);
    assert!(outcome.duration() < Duration::from_secs(10));
    assert_eq!(
        outcome.attempts[0].error.as_deref(),
        Some("Test timeout of 2000ms exceeded")
    );

    server.shutdown();
}

#[tokio::test]
async fn test_archived_scenario_runs_on_request() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = fixture_config(server.url(), dir.path());
    config.grep = Some("sanity".to_string());

    let mut runner = Runner::new(config.clone()).expect("Invalid config");
    let summary = runner.run(scenarios::all()).await.expect("Run failed");
    assert!(summary.outcomes.is_empty());

    config.include_archived = true;
    let summary = Runner::new(config)
        .expect("Invalid config")
        .run(scenarios::all())
        .await
        .expect("Run failed");
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(
        summary.outcomes[0].scenario,
        scenarios::locator_sanity::NAME
    );
    assert_eq!(summary.outcomes[0].status, TestStatus::Passed);

    server.shutdown();
}
