//! End-to-end audits against a `wiremock` site.
//!
//! The mock server plays every remote party at once: the audited page,
//! its robots.txt and sitemap, and the archival snapshot index.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seolens_core::{
    AdviceGenerator, AuditConfig, AuditError, Auditor, Grade, PageRenderer, PerformanceAuditor,
    PerformanceMetrics, Report, ReportDelivery, SearchIntent, StaticPerformance,
};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>How to care for leather boots | Example</title>
  <meta name="description" content="A step-by-step guide to cleaning, conditioning and storing leather boots so they last for years.">
  <meta property="og:title" content="Leather boot care guide">
  <link rel="alternate" hreflang="en" href="/guides/boot-care">
  <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Article", "headline": "Boot care"}</script>
</head>
<body>
  <h1>How to care for leather boots</h1>
  <p>This guide explains how to clean leather. Learn the tips that keep boots supple.</p>
  <img src="/img/boots.jpg" alt="Boots on a shelf">
  <a href="/blog">Blog</a>
  <a href="https://www.youtube.com/@example">Videos</a>
</body>
</html>"#;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("seolens-test-{}", uuid::Uuid::new_v4()))
}

fn config(server: &MockServer, scratch: &Path) -> AuditConfig {
    AuditConfig {
        archive_endpoint: format!("{}/cdx", server.uri()),
        scratch_dir: scratch.to_path_buf(),
        robots_timeout: Duration::from_secs(5),
        sitemap_timeout: Duration::from_secs(5),
        probe_timeout: Duration::from_secs(5),
        archive_timeout: Duration::from_secs(5),
        render_timeout: Duration::from_secs(5),
        ..AuditConfig::default()
    }
}

fn leftover_entries(scratch: &Path) -> usize {
    std::fs::read_dir(scratch).map(|dir| dir.count()).unwrap_or(0)
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/guides/boot-care"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nDisallow: /admin\nDisallow: /wp-admin\nDisallow: /cart\n\nSitemap: {}/sitemap.xml\n",
            server.uri()
        )))
        .mount(server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/xml"))
        .mount(server)
        .await;

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/</loc><priority>1.0</priority></url>
  <url><loc>{0}/blog/spring-collection</loc></url>
  <url><loc>{0}/guides/boot-care</loc><lastmod>2024-03-01</lastmod></url>
  <url><loc>{0}/about</loc></url>
</urlset>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(sitemap),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cdx"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[["timestamp"],["20200101000000"]]"#),
        )
        .mount(server)
        .await;
}

fn page_url(server: &MockServer) -> String {
    format!("{}/guides/boot-care", server.uri())
}

#[tokio::test]
async fn full_audit_produces_graded_report() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let scratch = scratch_dir();

    let auditor = Auditor::new(config(&server, &scratch))
        .unwrap()
        .with_performance(StaticPerformance::new(PerformanceMetrics {
            performance: 85,
            seo: 92,
            accessibility: 90,
            best_practices: 100,
            ..PerformanceMetrics::default()
        }));

    let report = auditor.audit(&page_url(&server)).await.unwrap();
    let findings = &report.structure.findings;

    assert_eq!(report.grade(), Grade::A);
    assert!(report.structure.robots_allowed);
    assert!(report.advice.is_none());

    assert_eq!(findings.markup.facts.h1_count, 1);
    assert!(findings.markup.structured_data.has_article);
    assert!(findings.markup.hreflang.is_valid);
    assert_eq!(findings.markup.links.internal_count, 1);
    assert_eq!(findings.markup.links.social[0].platform, "youtube");
    assert_eq!(
        findings.markup.images.images[0].src.as_deref(),
        Some(format!("{}/img/boots.jpg", server.uri()).as_str())
    );

    assert!(findings.robots.exists);
    assert_eq!(findings.robots.disallow_rules.len(), 3);

    assert!(findings.sitemaps.found);
    assert_eq!(findings.sitemaps.coverage.total_pages, 4);
    assert!(findings.sitemaps.coverage.has_current_page);

    let blog = findings.subpages.probes.iter().find(|p| p.path == "/blog").unwrap();
    assert!(blog.in_sitemap);
    assert_eq!(findings.subpages.summary.checked, 15);

    assert_eq!(findings.content.intent.intent, SearchIntent::Informational);
    assert!(findings.domain.age_years.is_some());

    assert_eq!(leftover_entries(&scratch), 0);
    std::fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn render_failure_is_a_hard_error_and_cleans_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let scratch = scratch_dir();

    let auditor = Auditor::new(config(&server, &scratch)).unwrap();
    let result = auditor.audit(&format!("{}/broken", server.uri())).await;

    assert!(
        matches!(result, Err(AuditError::Render { .. })),
        "expected Render error, got: {result:?}"
    );
    assert_eq!(leftover_entries(&scratch), 0);
    std::fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn empty_document_is_a_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   \n"))
        .mount(&server)
        .await;
    let scratch = scratch_dir();

    let auditor = Auditor::new(config(&server, &scratch)).unwrap();
    let result = auditor.audit(&format!("{}/blank", server.uri())).await;

    assert!(matches!(result, Err(AuditError::EmptyDocument { .. })));
    std::fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn non_http_url_is_rejected_before_rendering() {
    let scratch = scratch_dir();
    let auditor = Auditor::new(AuditConfig {
        scratch_dir: scratch.clone(),
        ..AuditConfig::default()
    })
    .unwrap();

    let result = auditor.audit("file:///etc/passwd").await;

    assert!(matches!(result, Err(AuditError::InvalidUrl { .. })));
    assert!(!scratch.exists());
}

// ---------------------------------------------------------------------------
// Pluggable collaborators
// ---------------------------------------------------------------------------

/// Renderer that checks it was handed an existing, private work directory.
struct FixtureRenderer {
    seen_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

#[async_trait]
impl PageRenderer for FixtureRenderer {
    async fn render(&self, _url: &Url, work_dir: &Path) -> Result<String> {
        assert!(work_dir.is_dir());
        self.seen_dirs.lock().unwrap().push(work_dir.to_path_buf());
        Ok(PAGE.to_string())
    }
}

struct FailingPerformance;

#[async_trait]
impl PerformanceAuditor for FailingPerformance {
    async fn audit(&self, _url: &Url) -> Result<PerformanceMetrics> {
        Err(anyhow!("lighthouse crashed"))
    }
}

struct CannedAdvice;

#[async_trait]
impl AdviceGenerator for CannedAdvice {
    async fn advise(&self, report: &Report) -> Result<Option<String>> {
        Ok(Some(format!("Grade {}: add Open Graph images.", report.grade())))
    }
}

#[derive(Default)]
struct RecordingDelivery {
    delivered: Mutex<Vec<Report>>,
}

#[async_trait]
impl ReportDelivery for RecordingDelivery {
    async fn deliver(&self, report: &Report) -> Result<()> {
        self.delivered.lock().unwrap().push(report.clone());
        Ok(())
    }
}

#[tokio::test]
async fn audit_and_deliver_attaches_advice_and_degrades_performance() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let scratch = scratch_dir();

    let seen_dirs = Arc::new(Mutex::new(Vec::new()));
    let renderer = FixtureRenderer {
        seen_dirs: Arc::clone(&seen_dirs),
    };
    let auditor = Auditor::new(config(&server, &scratch))
        .unwrap()
        .with_renderer(renderer)
        .with_performance(FailingPerformance);
    let delivery = RecordingDelivery::default();

    let report = auditor
        .audit_and_deliver(&page_url(&server), &CannedAdvice, &delivery)
        .await
        .unwrap();

    assert_eq!(report.metrics, PerformanceMetrics::default());
    assert_eq!(report.grade(), Grade::D);
    assert_eq!(report.advice.as_deref(), Some("Grade D: add Open Graph images."));

    let delivered = delivery.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, report.id);

    let seen_dirs = seen_dirs.lock().unwrap();
    assert_eq!(seen_dirs.len(), 1);
    assert!(seen_dirs[0].starts_with(&scratch));
    assert!(!seen_dirs[0].exists());
    assert_eq!(leftover_entries(&scratch), 0);
    std::fs::remove_dir_all(&scratch).ok();
}
