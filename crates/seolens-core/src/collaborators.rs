//! External collaborators of an audit
//!
//! Rendering, performance auditing, advice generation and report delivery
//! are capabilities supplied from outside the analysis pipeline. Each one is
//! a trait so callers can plug in a headless browser, a Lighthouse runner, a
//! language model or a mailer. The implementations here are the plain
//! defaults the command-line tool ships with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::AuditConfig;
use crate::performance::PerformanceMetrics;
use crate::report::Report;

/// Turns a URL into the final HTML of the page.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// `work_dir` is private to this audit and removed when it ends.
    async fn render(&self, url: &Url, work_dir: &Path) -> Result<String>;
}

/// Runs a performance audit and reports named scores.
#[async_trait]
pub trait PerformanceAuditor: Send + Sync {
    async fn audit(&self, url: &Url) -> Result<PerformanceMetrics>;
}

/// Produces free-form recommendations from a finished report.
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    async fn advise(&self, report: &Report) -> Result<Option<String>>;
}

/// Hands a finished report to its recipient.
#[async_trait]
pub trait ReportDelivery: Send + Sync {
    async fn deliver(&self, report: &Report) -> Result<()>;
}

/// Name of the snapshot [`HttpRenderer`] leaves in the work directory.
pub const SNAPSHOT_FILE: &str = "page.html";

/// Fetches the page over plain HTTP. No JavaScript is executed.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
    timeout: Duration,
}

impl HttpRenderer {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(client, config.render_timeout))
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &Url, work_dir: &Path) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to fetch URL")?;

        let status = response.status();
        if !status.is_success() {
            bail!("{url} answered with HTTP {}", status.as_u16());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        let snapshot = work_dir.join(SNAPSHOT_FILE);
        tokio::fs::write(&snapshot, &html)
            .await
            .with_context(|| format!("failed to write {}", snapshot.display()))?;
        debug!(%url, bytes = html.len(), "page fetched");

        Ok(html)
    }
}

/// Serves the same metrics for every URL, e.g. scores exported from a
/// separate Lighthouse run.
#[derive(Debug, Clone, Default)]
pub struct StaticPerformance {
    metrics: PerformanceMetrics,
}

impl StaticPerformance {
    pub fn new(metrics: PerformanceMetrics) -> Self {
        Self { metrics }
    }

    /// Load metrics from a JSON file in the [`PerformanceMetrics`] shape.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read metrics file {}", path.display()))?;
        let metrics: PerformanceMetrics = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse metrics file {}", path.display()))?;
        Ok(Self::new(metrics.clamped()))
    }
}

#[async_trait]
impl PerformanceAuditor for StaticPerformance {
    async fn audit(&self, _url: &Url) -> Result<PerformanceMetrics> {
        Ok(self.metrics.clone())
    }
}

/// Advice step that never produces any.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvice;

#[async_trait]
impl AdviceGenerator for NoAdvice {
    async fn advise(&self, _report: &Report) -> Result<Option<String>> {
        Ok(None)
    }
}
