//! Audit orchestration
//!
//! One [`Auditor`] can run any number of audits, concurrently or not. Each
//! audit owns its scratch directory and its results; nothing is shared
//! between them except the HTTP connection pool.

use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::collaborators::{
    AdviceGenerator, HttpRenderer, PageRenderer, PerformanceAuditor, ReportDelivery,
    StaticPerformance,
};
use crate::config::AuditConfig;
use crate::content::analyze_content;
use crate::domain::profile_domain;
use crate::error::AuditError;
use crate::markup::extract_markup;
use crate::performance::PerformanceMetrics;
use crate::report::{Findings, Report, aggregate};
use crate::robots::fetch_robots_policy;
use crate::sitemap::{DiscoveryTimeouts, discover_sitemaps};
use crate::subpages::audit_subpages;

pub struct Auditor {
    config: AuditConfig,
    client: Client,
    renderer: Arc<dyn PageRenderer>,
    performance: Arc<dyn PerformanceAuditor>,
}

impl Auditor {
    /// Auditor with the plain HTTP renderer and zeroed performance metrics.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        let renderer = HttpRenderer::with_client(client.clone(), config.render_timeout);

        Ok(Self {
            config,
            client,
            renderer: Arc::new(renderer),
            performance: Arc::new(StaticPerformance::default()),
        })
    }

    pub fn with_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_performance(mut self, performance: impl PerformanceAuditor + 'static) -> Self {
        self.performance = Arc::new(performance);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run every analyzer against `url` and aggregate the results.
    ///
    /// # Errors
    ///
    /// Only when there is nothing to analyze: the URL is not http(s), the
    /// renderer failed, or it returned an empty document. Every other
    /// failure degrades inside the component that hit it.
    pub async fn audit(&self, url: &str) -> Result<Report, AuditError> {
        let url = validate_url(url)?;
        info!(%url, "audit started");

        let html = self.render(&url).await?;

        // Parsed documents are not Send; extract everything before awaiting.
        let markup = extract_markup(&html, &url);
        drop(html);

        let timeouts = DiscoveryTimeouts {
            probe: self.config.probe_timeout,
            fetch: self.config.sitemap_timeout,
        };

        let robots_and_sitemaps = async {
            let robots = fetch_robots_policy(&self.client, &url, self.config.robots_timeout).await;
            let sitemaps = discover_sitemaps(
                &self.client,
                &url,
                &robots.sitemap_urls,
                &markup.facts.sitemap_links,
                timeouts,
            )
            .await;
            (robots, sitemaps)
        };

        let performance = async {
            match self.performance.audit(&url).await {
                Ok(metrics) => metrics,
                Err(error) => {
                    warn!(%url, error = %format!("{error:#}"), "performance audit failed, using zeroed metrics");
                    PerformanceMetrics::default()
                }
            }
        };

        let domain = profile_domain(
            &self.client,
            &url,
            &self.config.archive_endpoint,
            self.config.archive_timeout,
        );

        let ((robots, sitemaps), metrics, domain) =
            tokio::join!(robots_and_sitemaps, performance, domain);

        let subpages = audit_subpages(&robots, sitemaps.locations());
        let content = analyze_content(
            &markup.facts.title,
            &markup.facts.meta_description,
            &markup.facts.body_text,
        );

        let report = aggregate(
            &url,
            metrics,
            Findings {
                markup,
                robots,
                sitemaps,
                subpages,
                content,
                domain,
            },
        );

        info!(
            %url,
            id = %report.id,
            grade = %report.grade(),
            "audit finished"
        );
        Ok(report)
    }

    /// Audit, attach advice when the generator produces any, then deliver.
    ///
    /// A failing advice step is logged and skipped; a failing delivery is an
    /// error.
    pub async fn audit_and_deliver(
        &self,
        url: &str,
        advice: &dyn AdviceGenerator,
        delivery: &dyn ReportDelivery,
    ) -> anyhow::Result<Report> {
        let mut report = self.audit(url).await?;

        match advice.advise(&report).await {
            Ok(Some(text)) => report = report.with_advice(text),
            Ok(None) => {}
            Err(error) => warn!(id = %report.id, error = %format!("{error:#}"), "advice generation failed"),
        }

        delivery
            .deliver(&report)
            .await
            .context("report delivery failed")?;
        Ok(report)
    }

    /// Render into a fresh scratch directory that is removed afterwards,
    /// whether rendering worked or not.
    async fn render(&self, url: &Url) -> Result<String, AuditError> {
        let work_dir = self.config.scratch_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&work_dir).await?;

        let rendered = self.renderer.render(url, &work_dir).await;

        if let Err(error) = tokio::fs::remove_dir_all(&work_dir).await {
            warn!(dir = %work_dir.display(), %error, "failed to remove scratch directory");
        }

        let html = rendered.map_err(|error| AuditError::Render {
            url: url.to_string(),
            reason: format!("{error:#}"),
        })?;

        if html.trim().is_empty() {
            return Err(AuditError::EmptyDocument {
                url: url.to_string(),
            });
        }
        Ok(html)
    }
}

/// Parse `raw` and require an http(s) URL with a host.
pub fn validate_url(raw: &str) -> Result<Url, AuditError> {
    let invalid = |reason: String| AuditError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
