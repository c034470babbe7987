// HTML reporter - a self-contained report directory
//
// index.html embeds end-of-test screenshots as base64 so the report can be
// moved around; videos and HAR traces are linked by absolute path.
// results.json next to it carries the full summary.

use super::{Reporter, format_duration};
use crate::config::RunConfig;
use crate::error::Result;
use crate::outcome::{AttemptRecord, RunSummary, TestOutcome, TestStatus};
use crate::scenario::StepStatus;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const INDEX_FILE: &str = "index.html";
pub const RESULTS_FILE: &str = "results.json";

pub struct HtmlReporter {
    report_dir: PathBuf,
}

impl HtmlReporter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}

#[async_trait]
impl Reporter for HtmlReporter {
    async fn on_begin(&mut self, _config: &RunConfig, _total: usize) -> Result<()> {
        tokio::fs::create_dir_all(&self.report_dir).await?;
        Ok(())
    }

    async fn on_test_end(&mut self, _outcome: &TestOutcome) -> Result<()> {
        Ok(())
    }

    async fn on_end(&mut self, summary: &RunSummary) -> Result<()> {
        let mut screenshots = HashMap::new();
        for path in summary
            .outcomes
            .iter()
            .flat_map(|o| &o.attempts)
            .filter_map(|a| a.artifacts.screenshot.as_ref())
        {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    screenshots.insert(path.clone(), STANDARD.encode(bytes));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Screenshot missing from report"),
            }
        }

        tokio::fs::create_dir_all(&self.report_dir).await?;
        let index = self.report_dir.join(INDEX_FILE);
        tokio::fs::write(&index, render(summary, &screenshots)).await?;
        tokio::fs::write(
            self.report_dir.join(RESULTS_FILE),
            serde_json::to_string_pretty(summary)?,
        )
        .await?;

        info!(report = %index.display(), "HTML report written");
        Ok(())
    }
}

/// Renders the report page. `screenshots` maps screenshot paths to base64 PNG.
pub fn render(summary: &RunSummary, screenshots: &HashMap<PathBuf, String>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>cafe-e2e report</title>\n<style>\n\
         body { font-family: sans-serif; margin: 2rem; }\n\
         .passed { color: #2e7d32; } .flaky { color: #ef6c00; }\n\
         .failed, .timedout { color: #c62828; }\n\
         pre { background: #f5f5f5; padding: .5rem; white-space: pre-wrap; }\n\
         img { max-width: 640px; border: 1px solid #ccc; }\n\
         </style>\n</head>\n<body>\n<h1>cafe-e2e report</h1>\n",
    );

    let _ = writeln!(
        html,
        "<p class=\"summary\">{} passed, {} flaky, {} failed, {} timed out ({})</p>",
        summary.count(TestStatus::Passed),
        summary.count(TestStatus::Flaky),
        summary.count(TestStatus::Failed),
        summary.count(TestStatus::TimedOut),
        format_duration(summary.duration),
    );

    for outcome in &summary.outcomes {
        let class = status_class(outcome.status);
        let _ = writeln!(
            html,
            "<section class=\"test {class}\">\n<h2><span class=\"{class}\">{class}</span> [{}] {} ({})</h2>",
            escape(&outcome.project),
            escape(&outcome.scenario),
            format_duration(outcome.duration()),
        );
        for attempt in &outcome.attempts {
            render_attempt(&mut html, attempt, screenshots);
        }
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_attempt(html: &mut String, attempt: &AttemptRecord, screenshots: &HashMap<PathBuf, String>) {
    let title = if attempt.retry == 0 {
        "Run".to_string()
    } else {
        format!("Retry #{}", attempt.retry)
    };
    let _ = writeln!(
        html,
        "<h3>{title}: {} ({})</h3>\n<ol class=\"steps\">",
        if attempt.passed { "passed" } else { "failed" },
        format_duration(attempt.duration),
    );
    for step in &attempt.steps {
        let mark = match step.status {
            StepStatus::Passed => "✓",
            StepStatus::Failed => "✘",
        };
        let _ = writeln!(
            html,
            "<li>{mark} {} ({})</li>",
            escape(&step.title),
            format_duration(step.duration)
        );
    }
    html.push_str("</ol>\n");

    if let Some(error) = &attempt.error {
        let _ = writeln!(html, "<pre class=\"error\">{}</pre>", escape(error));
    }

    let artifacts = &attempt.artifacts;
    if let Some(data) = artifacts.screenshot.as_ref().and_then(|p| screenshots.get(p)) {
        let _ = writeln!(
            html,
            "<img alt=\"screenshot\" src=\"data:image/png;base64,{data}\">"
        );
    }
    for (label, path) in [
        ("video", artifacts.video_dir.as_ref()),
        ("trace (HAR)", artifacts.har.as_ref()),
    ] {
        if let Some(path) = path {
            let href = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            let _ = writeln!(
                html,
                "<p><a href=\"file://{}\">{label}</a></p>",
                escape(&href.to_string_lossy())
            );
        }
    }
}

fn status_class(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "passed",
        TestStatus::Flaky => "flaky",
        TestStatus::Failed => "failed",
        TestStatus::TimedOut => "timedout",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::tests::attempt;
    use std::time::Duration;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_escapes_and_embeds() {
        let mut failed = attempt(0, false);
        failed.error = Some("expected <Wolfys> got <Walnut Whip>".to_string());
        failed.artifacts.screenshot = Some(PathBuf::from("out/test-finished.png"));
        failed.artifacts.har = Some(PathBuf::from("/tmp/out/trace.har"));

        let summary = RunSummary {
            outcomes: vec![TestOutcome::new("Sort & check", "chromium", vec![failed])],
            duration: Duration::from_secs(2),
        };
        let screenshots = HashMap::from([(
            PathBuf::from("out/test-finished.png"),
            "iVBORw0KGgo=".to_string(),
        )]);

        let html = render(&summary, &screenshots);
        assert!(html.contains("0 passed, 0 flaky, 1 failed, 0 timed out (2.0s)"));
        assert!(html.contains("[chromium] Sort &amp; check"));
        assert!(html.contains("expected &lt;Wolfys&gt; got &lt;Walnut Whip&gt;"));
        assert!(html.contains("src=\"data:image/png;base64,iVBORw0KGgo=\""));
        assert!(html.contains("href=\"file:///tmp/out/trace.har\""));
        assert!(html.contains("✘ Open the product listing"));
    }

    #[tokio::test]
    async fn test_writes_index_and_results() {
        let dir = tempfile::tempdir().unwrap();
        let shot = dir.path().join("shot.png");
        tokio::fs::write(&shot, b"\x89PNG").await.unwrap();

        let mut passed = attempt(0, true);
        passed.artifacts.screenshot = Some(shot);
        let summary = RunSummary {
            outcomes: vec![TestOutcome::new("TCX2", "webkit", vec![passed])],
            duration: Duration::from_secs(1),
        };

        let report_dir = dir.path().join("report");
        let mut reporter = HtmlReporter::new(&report_dir);
        reporter.on_begin(&RunConfig::default(), 1).await.unwrap();
        reporter.on_end(&summary).await.unwrap();

        let index = std::fs::read_to_string(report_dir.join(INDEX_FILE)).unwrap();
        assert!(index.contains(&STANDARD.encode(b"\x89PNG")));

        let results: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(report_dir.join(RESULTS_FILE)).unwrap())
                .unwrap();
        assert_eq!(results["outcomes"][0]["status"], "passed");
        assert_eq!(results["outcomes"][0]["project"], "webkit");
    }
}
