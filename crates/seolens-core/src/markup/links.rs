//! Anchor classification: internal, external and social-platform links

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::parser::{element_text, has_rel, select_all};
use crate::url_utils::{bare_host, resolve_url};

/// Link records kept per list; counts always cover every link.
pub const MAX_LISTED_LINKS: usize = 50;

/// Platform name and the hosts (without `www.`) that belong to it.
const SOCIAL_HOSTS: &[(&str, &[&str])] = &[
    ("facebook", &["facebook.com", "fb.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("instagram", &["instagram.com"]),
    ("linkedin", &["linkedin.com"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("tiktok", &["tiktok.com"]),
    ("pinterest", &["pinterest.com"]),
    ("github", &["github.com"]),
];

const SKIPPED_PREFIXES: &[&str] = &["#", "javascript:", "mailto:"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    pub nofollow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkAnalysis {
    pub internal_count: usize,
    pub external_count: usize,
    pub nofollow_count: usize,
    pub internal: Vec<LinkRecord>,
    pub external: Vec<LinkRecord>,
    pub social: Vec<SocialLink>,
}

/// Platform of a social-network URL, if the host is a known one.
pub fn social_platform(url: &Url) -> Option<&'static str> {
    let host = bare_host(url)?;
    SOCIAL_HOSTS
        .iter()
        .find(|(_, hosts)| {
            hosts
                .iter()
                .any(|known| host == *known || host.ends_with(&format!(".{known}")))
        })
        .map(|(platform, _)| *platform)
}

pub fn analyze_links(html: &str, page_url: &Url) -> LinkAnalysis {
    let document = Html::parse_document(html);
    links(&document, page_url)
}

pub(crate) fn links(document: &Html, page_url: &Url) -> LinkAnalysis {
    let mut analysis = LinkAnalysis::default();
    let page_host = bare_host(page_url);

    for anchor in select_all(document, "a[href]") {
        let raw = anchor.value().attr("href").unwrap_or_default().trim();
        let lower = raw.to_ascii_lowercase();
        if raw.is_empty() || SKIPPED_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
            continue;
        }

        let Some(resolved) = resolve_url(page_url, raw) else {
            continue;
        };
        let Ok(target) = Url::parse(&resolved) else {
            continue;
        };
        if !matches!(target.scheme(), "http" | "https") {
            continue;
        }

        let nofollow = has_rel(anchor, "nofollow");
        if nofollow {
            analysis.nofollow_count += 1;
        }

        let record = LinkRecord {
            url: resolved,
            text: element_text(anchor),
            nofollow,
        };

        if bare_host(&target) == page_host {
            analysis.internal_count += 1;
            if analysis.internal.len() < MAX_LISTED_LINKS {
                analysis.internal.push(record);
            }
            continue;
        }

        analysis.external_count += 1;
        if let Some(platform) = social_platform(&target) {
            if !analysis.social.iter().any(|social| social.url == record.url) {
                analysis.social.push(SocialLink {
                    platform: platform.to_string(),
                    url: record.url.clone(),
                });
            }
        }
        if analysis.external.len() < MAX_LISTED_LINKS {
            analysis.external.push(record);
        }
    }

    analysis
}
