//! Sitemap discovery across robots.txt, page markup and conventional paths

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::{SitemapAnalysis, SitemapCoverage, analyze_sitemap};
use crate::url_utils::{normalize_origin, resolve_url};

/// Conventional sitemap locations, tried in order when nothing else was found.
pub const WELL_KNOWN_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemap/sitemap.xml",
    "/sitemaps/sitemap.xml",
    "/wp-sitemap.xml",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SitemapSource {
    RobotsTxt,
    HtmlLink,
    WellKnownPath,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveredSitemap {
    pub source: SitemapSource,
    pub analysis: SitemapAnalysis,
}

/// Every sitemap that was tried, plus coverage summed over the analyzed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SitemapDiscovery {
    pub found: bool,
    pub sitemaps: Vec<DiscoveredSitemap>,
    pub coverage: SitemapCoverage,
}

impl SitemapDiscovery {
    /// Locations from every successfully analyzed sitemap.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.sitemaps
            .iter()
            .filter(|s| s.analysis.analyzed)
            .flat_map(|s| s.analysis.locations.iter().map(String::as_str))
    }

    fn push(&mut self, source: SitemapSource, analysis: SitemapAnalysis) {
        if analysis.analyzed {
            self.found = true;
            self.coverage.merge(&analysis.coverage);
        }
        self.sitemaps.push(DiscoveredSitemap { source, analysis });
    }

    fn contains(&self, url: &str) -> bool {
        self.sitemaps.iter().any(|s| s.analysis.url == url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProbeOutcome {
    /// 2xx with an XML content type
    Sitemap,
    /// Probe could not tell; fall back to a full fetch
    Inconclusive,
    Missing(String),
}

/// Timeouts used during discovery.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryTimeouts {
    pub probe: Duration,
    pub fetch: Duration,
}

/// Find, fetch and analyze the sitemaps of the audited site.
///
/// Order: every sitemap declared in robots.txt (probed first), then
/// `<link rel="sitemap">` targets from the page, then, only if none of those
/// could be analyzed, [`WELL_KNOWN_SITEMAP_PATHS`] until the first one that
/// parses as a sitemap.
pub async fn discover_sitemaps(
    client: &Client,
    audited_url: &Url,
    robots_sitemap_urls: &[String],
    page_sitemap_links: &[String],
    timeouts: DiscoveryTimeouts,
) -> SitemapDiscovery {
    let mut discovery = SitemapDiscovery::default();
    let audited = audited_url.as_str();

    let mut declared: Vec<String> = Vec::new();
    for raw in robots_sitemap_urls {
        if let Some(url) = resolve_url(audited_url, raw) {
            if !declared.contains(&url) {
                declared.push(url);
            }
        }
    }

    let robots_results = join_all(declared.iter().map(|url| async move {
        match probe_sitemap(client, url, timeouts.probe).await {
            ProbeOutcome::Missing(reason) => SitemapAnalysis::failed(url, reason),
            outcome => {
                debug!(sitemap_url = %url, ?outcome, "sitemap probe passed");
                analyze_sitemap(client, url, audited, timeouts.fetch).await
            }
        }
    }))
    .await;

    for analysis in robots_results {
        discovery.push(SitemapSource::RobotsTxt, analysis);
    }

    let mut linked: Vec<String> = Vec::new();
    for raw in page_sitemap_links {
        if let Some(url) = resolve_url(audited_url, raw) {
            if !discovery.contains(&url) && !linked.contains(&url) {
                linked.push(url);
            }
        }
    }

    let link_results = join_all(
        linked
            .iter()
            .map(|url| analyze_sitemap(client, url, audited, timeouts.fetch)),
    )
    .await;

    for analysis in link_results {
        discovery.push(SitemapSource::HtmlLink, analysis);
    }

    if !discovery.found {
        let origin = normalize_origin(audited);
        for path in WELL_KNOWN_SITEMAP_PATHS {
            let url = format!("{origin}{path}");
            if discovery.contains(&url) {
                continue;
            }
            let analysis = analyze_sitemap(client, &url, audited, timeouts.fetch).await;
            // Success means a parsable sitemap, not merely a 2xx: catch-all
            // routes answer every path with an HTML page.
            let analyzed = analysis.analyzed;
            discovery.push(SitemapSource::WellKnownPath, analysis);
            if analyzed {
                break;
            }
        }
    }

    info!(
        url = %audited_url,
        found = discovery.found,
        tried = discovery.sitemaps.len(),
        pages = discovery.coverage.total_pages,
        "sitemap discovery finished"
    );

    discovery
}

async fn probe_sitemap(client: &Client, url: &str, timeout: Duration) -> ProbeOutcome {
    let response = match client.head(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(error) => {
            debug!(sitemap_url = %url, %error, "HEAD probe failed, falling back to GET");
            return ProbeOutcome::Inconclusive;
        }
    };

    let status = response.status();
    if status.as_u16() == 404 || status.as_u16() == 410 {
        return ProbeOutcome::Missing(format!("sitemap not found ({})", status.as_u16()));
    }
    if !status.is_success() {
        // Some servers reject HEAD outright
        return ProbeOutcome::Inconclusive;
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.contains("xml") {
        ProbeOutcome::Sitemap
    } else {
        ProbeOutcome::Inconclusive
    }
}
