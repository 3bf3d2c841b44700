//! # seolens-core
//!
//! Core library for auditing the on-page and technical SEO of a single URL.
//!
//! This library provides:
//! - robots.txt parsing and longest-prefix path evaluation
//! - Sitemap discovery, parsing and URL categorisation
//! - Robots/sitemap consistency checks for conventional site paths
//! - Content heuristics: keywords, readability, uniqueness, search intent
//! - Markup extraction: JSON-LD, Open Graph, hreflang, links, images
//! - Domain age profiling from an archival snapshot index
//! - Aggregation into one graded, JSON-serializable [`Report`]
//!
//! Parsing and scoring functions are pure. Network-facing functions never
//! fail: they record the reason in the component's `error` field and fall
//! back to permissive defaults.
//!
//! ## Example
//!
//! ```no_run
//! use seolens_core::{AuditConfig, Auditor};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let auditor = Auditor::new(AuditConfig::from_env()?)?;
//! let report = auditor.audit("https://example.com/").await?;
//! println!("{} scored {}", report.url, report.grade());
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod collaborators;
pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod markup;
pub mod parser;
pub mod performance;
pub mod report;
pub mod robots;
pub mod sitemap;
pub mod subpages;
pub mod url_utils;

// Re-export commonly used types
pub use audit::{Auditor, validate_url};
pub use collaborators::{
    AdviceGenerator, HttpRenderer, NoAdvice, PageRenderer, PerformanceAuditor, ReportDelivery,
    StaticPerformance,
};
pub use config::AuditConfig;
pub use content::{ContentScore, SearchIntent, analyze_content};
pub use domain::{AuthorityTier, DomainProfile};
pub use error::{AuditError, ConfigError, FetchError};
pub use markup::{PageMarkup, extract_markup};
pub use parser::{PageFacts, extract_json_ld_blocks, extract_page_facts, sanitize_html};
pub use performance::{PerformanceMetrics, TimingAudit};
pub use report::{Grade, Report, aggregate};
pub use robots::{RobotsPolicy, is_allowed, parse_robots_txt};
pub use sitemap::{SitemapAnalysis, SitemapCoverage, SitemapDiscovery};
pub use subpages::{SubpageAudit, audit_subpages};
