//! XML sitemap parsing and classification

pub mod discovery;

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;
use crate::robots::fetch_text;
use crate::url_utils::{resolve_url, same_page};

pub use discovery::{
    DiscoveredSitemap, DiscoveryTimeouts, SitemapDiscovery, SitemapSource, discover_sitemaps,
};

/// Number of entries kept in [`SitemapAnalysis::entries`].
pub const MAX_LISTED_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SitemapKind {
    UrlSet,
    Index,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UrlCategory {
    Category,
    Product,
    Blog,
    Static,
    Current,
    Other,
    /// Child entry of a sitemap index
    Sitemap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SitemapEntry {
    pub location: String,
    pub last_modified: Option<String>,
    pub change_frequency: Option<String>,
    pub priority: Option<String>,
    pub category: UrlCategory,
}

/// Per-category page counts for one or more urlset sitemaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SitemapCoverage {
    pub total_pages: usize,
    pub category_pages: usize,
    pub product_pages: usize,
    pub blog_pages: usize,
    pub static_pages: usize,
    pub current_pages: usize,
    pub other_pages: usize,
    pub has_current_page: bool,
}

impl SitemapCoverage {
    fn record(&mut self, category: UrlCategory) {
        self.total_pages += 1;
        match category {
            UrlCategory::Category => self.category_pages += 1,
            UrlCategory::Product => self.product_pages += 1,
            UrlCategory::Blog => self.blog_pages += 1,
            UrlCategory::Static => self.static_pages += 1,
            UrlCategory::Current => self.current_pages += 1,
            UrlCategory::Other | UrlCategory::Sitemap => self.other_pages += 1,
        }
    }

    /// Sum counts into `self`; `has_current_page` is true if either side found it.
    pub fn merge(&mut self, other: &SitemapCoverage) {
        self.total_pages += other.total_pages;
        self.category_pages += other.category_pages;
        self.product_pages += other.product_pages;
        self.blog_pages += other.blog_pages;
        self.static_pages += other.static_pages;
        self.current_pages += other.current_pages;
        self.other_pages += other.other_pages;
        self.has_current_page |= other.has_current_page;
    }
}

/// Result of analysing one sitemap URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SitemapAnalysis {
    pub url: String,
    pub analyzed: bool,
    pub kind: Option<SitemapKind>,
    /// Child sitemaps listed by an index (not fetched)
    pub sitemap_count: usize,
    /// First [`MAX_LISTED_ENTRIES`] entries
    pub entries: Vec<SitemapEntry>,
    pub coverage: SitemapCoverage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every `<loc>` in the document, used for membership checks
    #[serde(skip)]
    pub locations: Vec<String>,
}

impl SitemapAnalysis {
    pub fn failed(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            analyzed: false,
            kind: None,
            sitemap_count: 0,
            entries: Vec::new(),
            coverage: SitemapCoverage::default(),
            error: Some(reason.into()),
            locations: Vec::new(),
        }
    }
}

/// Ordered substring rules; the first matching row wins.
const CATEGORY_RULES: &[(UrlCategory, &[&str])] = &[
    (UrlCategory::Category, &["/category", "/categories", "/tag/", "/tags/"]),
    (UrlCategory::Product, &["/product", "/item", "/shop/"]),
    (UrlCategory::Blog, &["/blog", "/post", "/article", "/news/"]),
];

/// Classify a sitemap location relative to the audited page.
///
/// Precedence: category/tag, product/item, blog/post/article, the audited
/// page itself, shallow paths (at most one segment) as static, else other.
pub fn classify_url(location: &str, audited_url: &str) -> UrlCategory {
    let lower = location.to_ascii_lowercase();

    if let Some((category, _)) = CATEGORY_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lower.contains(needle)))
    {
        return *category;
    }

    if same_page(location, audited_url) {
        return UrlCategory::Current;
    }

    let depth = Url::parse(location)
        .map(|url| {
            url.path_segments()
                .map(|segments| segments.filter(|s| !s.is_empty()).count())
                .unwrap_or(0)
        })
        .unwrap_or(usize::MAX);

    if depth <= 1 {
        UrlCategory::Static
    } else {
        UrlCategory::Other
    }
}

#[derive(Default)]
struct PendingEntry {
    loc: Option<String>,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
}

/// Parse sitemap XML (urlset or sitemap index).
///
/// Relative `<loc>` values are resolved against `sitemap_url` (or the audited
/// URL when the sitemap URL is not absolute); unresolvable ones are skipped.
///
/// # Errors
///
/// [`FetchError::Xml`] for malformed markup and [`FetchError::NotASitemap`]
/// when the root element is neither `<urlset>` nor `<sitemapindex>`.
pub fn parse_sitemap(
    sitemap_url: &str,
    xml: &str,
    audited_url: &str,
) -> Result<SitemapAnalysis, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut kind: Option<SitemapKind> = None;
    let mut pending: Option<PendingEntry> = None;
    let mut current_field = String::new();
    let mut raw_entries: Vec<PendingEntry> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
                if kind.is_none() {
                    kind = match name.as_str() {
                        "urlset" => Some(SitemapKind::UrlSet),
                        "sitemapindex" => Some(SitemapKind::Index),
                        _ => return Err(FetchError::NotASitemap),
                    };
                    continue;
                }
                match name.as_str() {
                    "url" | "sitemap" => pending = Some(PendingEntry::default()),
                    _ => current_field = name,
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
                if matches!(name.as_str(), "url" | "sitemap") {
                    if let Some(entry) = pending.take() {
                        raw_entries.push(entry);
                    }
                }
                current_field.clear();
            }
            Event::Text(e) => {
                let text = e.unescape()?.trim().to_string();
                assign_field(pending.as_mut(), &current_field, text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                assign_field(pending.as_mut(), &current_field, text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let Some(kind) = kind else {
        return Err(FetchError::NotASitemap);
    };

    let mut analysis = SitemapAnalysis {
        url: sitemap_url.to_string(),
        analyzed: true,
        kind: Some(kind),
        sitemap_count: 0,
        entries: Vec::new(),
        coverage: SitemapCoverage::default(),
        error: None,
        locations: Vec::new(),
    };

    let base = Url::parse(sitemap_url)
        .or_else(|_| Url::parse(audited_url))
        .ok();

    for raw in raw_entries {
        let Some(location) = raw
            .loc
            .as_deref()
            .and_then(|loc| absolute_location(base.as_ref(), loc))
        else {
            continue;
        };

        let category = match kind {
            SitemapKind::Index => UrlCategory::Sitemap,
            SitemapKind::UrlSet => {
                let category = classify_url(&location, audited_url);
                analysis.coverage.record(category);
                if same_page(&location, audited_url) {
                    analysis.coverage.has_current_page = true;
                }
                category
            }
        };

        if kind == SitemapKind::Index {
            analysis.sitemap_count += 1;
        }

        if analysis.entries.len() < MAX_LISTED_ENTRIES {
            analysis.entries.push(SitemapEntry {
                location: location.clone(),
                last_modified: raw.lastmod,
                change_frequency: raw.changefreq,
                priority: raw.priority,
                category,
            });
        }
        analysis.locations.push(location);
    }

    Ok(analysis)
}

fn absolute_location(base: Option<&Url>, loc: &str) -> Option<String> {
    match base {
        Some(base) => resolve_url(base, loc),
        None => Url::parse(loc.trim()).ok().map(String::from),
    }
}

fn assign_field(entry: Option<&mut PendingEntry>, field: &str, text: String) {
    let Some(entry) = entry else {
        return;
    };
    if text.is_empty() {
        return;
    }
    // First value wins: extension tags such as <image:loc> share local names
    let slot = match field {
        "loc" => &mut entry.loc,
        "lastmod" => &mut entry.lastmod,
        "changefreq" => &mut entry.changefreq,
        "priority" => &mut entry.priority,
        _ => return,
    };
    if slot.is_none() {
        *slot = Some(text);
    }
}

/// Fetch and parse one sitemap. Failures are reported in the returned value.
pub async fn analyze_sitemap(
    client: &Client,
    sitemap_url: &str,
    audited_url: &str,
    timeout: Duration,
) -> SitemapAnalysis {
    debug!(%sitemap_url, "fetching sitemap");

    let result = match fetch_text(client, sitemap_url, timeout).await {
        Ok(body) => parse_sitemap(sitemap_url, &body, audited_url),
        Err(error) => Err(error),
    };

    match result {
        Ok(analysis) => {
            debug!(
                %sitemap_url,
                pages = analysis.coverage.total_pages,
                children = analysis.sitemap_count,
                "sitemap parsed"
            );
            analysis
        }
        Err(error) => {
            warn!(%sitemap_url, %error, "sitemap could not be analyzed");
            SitemapAnalysis::failed(sitemap_url, error.to_string())
        }
    }
}
