//! Hreflang alternate-language annotations

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::parser::{has_rel, select_all};
use crate::url_utils::resolve_url;

const X_DEFAULT: &str = "x-default";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HreflangSource {
    /// `<link rel="alternate" hreflang=...>` in the head
    LinkTag,
    /// `<a rel="alternate" hreflang=...>` in the body
    Anchor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HreflangEntry {
    pub lang: String,
    /// Absolute URL
    pub href: String,
    pub source: HreflangSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HreflangSet {
    pub entries: Vec<HreflangEntry>,
    pub has_x_default: bool,
    pub is_valid: bool,
}

impl HreflangSet {
    /// Distinct declared languages, `x-default` excluded.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if entry.lang != X_DEFAULT && !languages.contains(&entry.lang.as_str()) {
                languages.push(&entry.lang);
            }
        }
        languages
    }
}

pub fn extract_hreflang(html: &str, page_url: &Url) -> HreflangSet {
    let document = Html::parse_document(html);
    hreflang(&document, page_url)
}

pub(crate) fn hreflang(document: &Html, page_url: &Url) -> HreflangSet {
    let mut set = HreflangSet::default();

    let sources = [
        (HreflangSource::LinkTag, "link[hreflang][href]"),
        (HreflangSource::Anchor, "a[hreflang][href]"),
    ];

    for (source, pattern) in sources {
        for element in select_all(document, pattern) {
            if !has_rel(element, "alternate") {
                continue;
            }
            let lang = element
                .value()
                .attr("hreflang")
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            let Some(href) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_url(page_url, href))
            else {
                continue;
            };
            if lang.is_empty() {
                continue;
            }
            let duplicate = set
                .entries
                .iter()
                .any(|entry| entry.lang == lang && entry.href == href);
            if !duplicate {
                set.entries.push(HreflangEntry { lang, href, source });
            }
        }
    }

    set.has_x_default = set.entries.iter().any(|entry| entry.lang == X_DEFAULT);

    let self_referencing = set.entries.iter().any(|entry| {
        Url::parse(&entry.href)
            .map(|href| href.path().trim_end_matches('/') == page_url.path().trim_end_matches('/'))
            .unwrap_or(false)
    });
    set.is_valid = !set.entries.is_empty() && (set.languages().len() > 1 || self_referencing);

    set
}
