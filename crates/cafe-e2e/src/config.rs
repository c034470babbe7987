// Run configuration
//
// Process-wide settings handed to the runner at startup. Every field has a
// documented default; a JSON file, the environment (BASE_URL, HEADED) and
// CLI flags are layered over the defaults in that order.

use crate::error::{Error, Result};
use crate::scenario::Scenario;
use crate::scenarios::ARCHIVE_TAG;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default storefront
pub const DEFAULT_BASE_URL: &str = "https://highlifeshop.com";

/// Browser engine a project runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Chromium,
    Firefox,
    Webkit,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Chromium => "chromium",
            Engine::Firefox => "firefox",
            Engine::Webkit => "webkit",
        }
    }
}

/// A named browser configuration the suite runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub engine: Engine,
    /// Device profile the project emulates (informational)
    pub device: String,
}

impl Project {
    pub fn new(name: impl Into<String>, engine: Engine, device: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine,
            device: device.into(),
        }
    }

    /// chromium, firefox and webkit desktop projects
    pub fn desktop_defaults() -> Vec<Project> {
        vec![
            Project::new("chromium", Engine::Chromium, "Desktop Chrome"),
            Project::new("firefox", Engine::Firefox, "Desktop Firefox"),
            Project::new("webkit", Engine::Webkit, "Desktop Safari"),
        ]
    }
}

/// When video and trace artifacts are recorded and kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactMode {
    Off,
    #[default]
    On,
    /// Record every attempt, keep only failing ones
    RetainOnFailure,
    /// Record and keep only the first retry
    OnFirstRetry,
}

impl ArtifactMode {
    /// Whether attempt number `retry` (0 = first run) records at all.
    pub fn records(self, retry: u32) -> bool {
        match self {
            ArtifactMode::Off => false,
            ArtifactMode::On | ArtifactMode::RetainOnFailure => true,
            ArtifactMode::OnFirstRetry => retry == 1,
        }
    }

    /// Whether a recorded attempt's artifacts survive its outcome.
    pub fn keeps(self, retry: u32, passed: bool) -> bool {
        match self {
            ArtifactMode::Off => false,
            ArtifactMode::On => true,
            ArtifactMode::RetainOnFailure => !passed,
            ArtifactMode::OnFirstRetry => retry == 1,
        }
    }
}

/// When the end-of-test screenshot is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    Off,
    #[default]
    On,
    OnlyOnFailure,
}

impl ScreenshotMode {
    pub fn takes(self, passed: bool) -> bool {
        match self {
            ScreenshotMode::Off => false,
            ScreenshotMode::On => true,
            ScreenshotMode::OnlyOnFailure => !passed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    /// One console line per finished test
    List,
    /// HTML report in `report_dir`
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// Settings for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    /// Budget for one test attempt (default: 120s)
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Budget for a navigation or load-state wait (default: 30s)
    #[serde(with = "duration_ms")]
    pub navigation_timeout: Duration,
    /// Extra attempts after a failure, each from scratch (default: 1)
    pub retries: u32,
    /// Run tests concurrently (default: true)
    pub fully_parallel: bool,
    /// Concurrent tests when fully parallel (default: half the cores)
    pub workers: usize,
    /// default: true
    pub headless: bool,
    /// default: 1920x1080
    pub viewport: ViewportSize,
    /// default: https://highlifeshop.com, or BASE_URL
    pub base_url: String,
    /// default: on
    pub screenshot: ScreenshotMode,
    /// default: on
    pub video: ArtifactMode,
    /// Network trace recorded as HAR (default: on)
    pub trace: ArtifactMode,
    /// default: chromium, firefox, webkit
    pub projects: Vec<Project>,
    /// default: list and html
    pub reporters: Vec<ReporterKind>,
    /// Per-test artifacts (default: test-results)
    pub output_dir: PathBuf,
    /// HTML report (default: playwright-report)
    pub report_dir: PathBuf,
    /// Only run scenarios whose name matches this regex
    pub grep: Option<String>,
    /// Also run archived scenarios (default: false)
    pub include_archived: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            navigation_timeout: crate::session::DEFAULT_NAVIGATION_TIMEOUT,
            retries: 1,
            fully_parallel: true,
            workers: default_workers(),
            headless: true,
            viewport: ViewportSize {
                width: 1920,
                height: 1080,
            },
            base_url: DEFAULT_BASE_URL.to_string(),
            screenshot: ScreenshotMode::On,
            video: ArtifactMode::On,
            trace: ArtifactMode::On,
            projects: Project::desktop_defaults(),
            reporters: vec![ReporterKind::List, ReporterKind::Html],
            output_dir: PathBuf::from("test-results"),
            report_dir: PathBuf::from("playwright-report"),
            grep: None,
            include_archived: false,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| (n.get() / 2).max(1))
        .unwrap_or(1)
}

impl RunConfig {
    /// Defaults with the process environment applied.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).context(format!("reading {}", path.display())))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Applies BASE_URL and HEADED from `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(headed) = lookup("HEADED") {
            let headed = matches!(headed.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            self.headless = !headed;
        }
        self
    }

    /// Keeps only the named projects, failing on unknown names.
    pub fn select_projects(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            if !self.projects.iter().any(|p| &p.name == name) {
                return Err(Error::Config(format!("unknown project '{name}'")));
            }
        }
        self.projects.retain(|p| names.contains(&p.name));
        Ok(())
    }

    /// Concurrency actually used by the runner.
    pub fn effective_workers(&self) -> usize {
        if self.fully_parallel {
            self.workers.max(1)
        } else {
            1
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("base URL '{}': {e}", self.base_url)))?;
        if self.projects.is_empty() {
            return Err(Error::Config("no projects configured".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be positive".to_string()));
        }
        self.grep_regex()?;
        Ok(())
    }

    fn grep_regex(&self) -> Result<Option<Regex>> {
        self.grep
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| Error::Config(format!("grep '{pattern}': {e}")))
            })
            .transpose()
    }

    /// Scenarios this run will execute, in catalogue order.
    pub fn select_scenarios(&self, scenarios: Vec<Scenario>) -> Result<Vec<Scenario>> {
        let grep = self.grep_regex()?;
        Ok(scenarios
            .into_iter()
            .filter(|s| self.include_archived || !s.has_tag(ARCHIVE_TAG))
            .filter(|s| grep.as_ref().is_none_or(|re| re.is_match(s.name())))
            .collect())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
