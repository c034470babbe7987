// List reporter - one console line per finished test

use super::{Reporter, format_duration};
use crate::config::RunConfig;
use crate::error::Result;
use crate::outcome::{RunSummary, TestOutcome, TestStatus};
use async_trait::async_trait;
use std::io::Write;

/// Writes progress lines and a closing summary to `out`.
pub struct ListReporter<W: Write + Send> {
    out: W,
    total: usize,
    finished: usize,
}

impl ListReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ListReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            total: 0,
            finished: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn marker(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "✓",
        TestStatus::Flaky => "±",
        TestStatus::Failed | TestStatus::TimedOut => "✘",
    }
}

#[async_trait]
impl<W: Write + Send> Reporter for ListReporter<W> {
    async fn on_begin(&mut self, config: &RunConfig, total: usize) -> Result<()> {
        self.total = total;
        self.finished = 0;
        let workers = config.effective_workers().min(total.max(1));
        writeln!(
            self.out,
            "\nRunning {total} test{} using {workers} worker{}\n",
            if total == 1 { "" } else { "s" },
            if workers == 1 { "" } else { "s" },
        )?;
        Ok(())
    }

    async fn on_test_end(&mut self, outcome: &TestOutcome) -> Result<()> {
        self.finished += 1;
        let retries = match outcome.retries() {
            0 => String::new(),
            n => format!(" (retries: {n})"),
        };
        writeln!(
            self.out,
            "  {} {:>3}/{} [{}] › {} ({}){retries}",
            marker(outcome.status),
            self.finished,
            self.total,
            outcome.project,
            outcome.scenario,
            format_duration(outcome.duration()),
        )?;

        if !outcome.status.is_ok()
            && let Some(error) = outcome.last_attempt().and_then(|a| a.error.as_deref())
        {
            for line in error.lines() {
                writeln!(self.out, "      {line}")?;
            }
        }
        Ok(())
    }

    async fn on_end(&mut self, summary: &RunSummary) -> Result<()> {
        writeln!(self.out)?;
        let failed: Vec<_> = summary
            .outcomes
            .iter()
            .filter(|o| !o.status.is_ok())
            .collect();
        for outcome in &failed {
            writeln!(
                self.out,
                "  [{}] › {} ({:?})",
                outcome.project, outcome.scenario, outcome.status
            )?;
        }
        if !failed.is_empty() {
            writeln!(self.out)?;
        }

        let timed_out = summary.count(TestStatus::TimedOut);
        let failed = summary.count(TestStatus::Failed);
        let flaky = summary.count(TestStatus::Flaky);
        if failed > 0 {
            writeln!(self.out, "  {failed} failed")?;
        }
        if timed_out > 0 {
            writeln!(self.out, "  {timed_out} timed out")?;
        }
        if flaky > 0 {
            writeln!(self.out, "  {flaky} flaky")?;
        }
        writeln!(
            self.out,
            "  {} passed ({})",
            summary.count(TestStatus::Passed),
            format_duration(summary.duration)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::tests::attempt;
    use std::time::Duration;

    fn output(reporter: ListReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_lines_for_each_status() {
        let mut reporter = ListReporter::new(Vec::new());
        let mut config = RunConfig::default();
        config.workers = 4;
        reporter.on_begin(&config, 2).await.unwrap();

        let passed = TestOutcome::new("Sort Products by Name Descending", "chromium", vec![attempt(0, true)]);
        let failed = TestOutcome::new(
            "Sort Products by Name in both directions",
            "webkit",
            vec![attempt(0, false), attempt(1, false)],
        );
        reporter.on_test_end(&passed).await.unwrap();
        reporter.on_test_end(&failed).await.unwrap();
        reporter
            .on_end(&RunSummary {
                outcomes: vec![passed, failed],
                duration: Duration::from_secs(12),
            })
            .await
            .unwrap();

        let text = output(reporter);
        assert!(text.contains("Running 2 tests using 2 workers"));
        assert!(text.contains("✓   1/2 [chromium] › Sort Products by Name Descending (1.5s)"));
        assert!(text.contains("✘   2/2 [webkit] › Sort Products by Name in both directions (3.0s) (retries: 1)"));
        assert!(text.contains("      Assertion failed: order differs"));
        assert!(text.contains("  1 failed\n"));
        assert!(text.contains("  1 passed (12.0s)"));
    }

    #[tokio::test]
    async fn test_flaky_marker() {
        let mut reporter = ListReporter::new(Vec::new());
        reporter.on_begin(&RunConfig::default(), 1).await.unwrap();
        let flaky = TestOutcome::new("TCX2", "firefox", vec![attempt(0, false), attempt(1, true)]);
        reporter.on_test_end(&flaky).await.unwrap();

        let text = output(reporter);
        assert!(text.contains("±   1/1 [firefox] › TCX2"));
        assert!(!text.contains("Assertion failed"));
    }
}
