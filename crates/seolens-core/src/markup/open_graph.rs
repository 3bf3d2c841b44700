//! Open Graph and Twitter card extraction with completeness scoring

use std::collections::BTreeMap;

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::parser::select_all;
use crate::url_utils::resolve_url;

/// Properties read from `<meta property|name=... content=...>`.
const OG_PROPERTIES: &[&str] = &[
    "og:title",
    "og:description",
    "og:type",
    "og:url",
    "og:site_name",
    "og:locale",
    "og:locale:alternate",
    "og:updated_time",
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "og:image:width",
    "og:image:height",
    "og:image:alt",
    "og:image:type",
    "og:video",
    "og:video:url",
    "og:video:secure_url",
    "og:video:type",
    "og:video:width",
    "og:video:height",
    "fb:app_id",
    "fb:admins",
    "fb:pages",
    "twitter:card",
    "twitter:site",
    "twitter:creator",
    "twitter:title",
    "twitter:description",
    "twitter:image",
    "twitter:image:alt",
    "article:published_time",
    "article:modified_time",
    "article:author",
    "article:section",
    "article:tag",
    "video:duration",
    "video:release_date",
    "video:tag",
];

/// Properties whose values are URLs and get resolved against the page.
const URL_PROPERTIES: &[&str] = &[
    "og:url",
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "og:video",
    "og:video:url",
    "og:video:secure_url",
    "twitter:image",
];

const SOCIAL_ID_PROPERTIES: &[&str] =
    &["fb:app_id", "fb:admins", "fb:pages", "twitter:site", "twitter:creator"];

const TIME_PROPERTIES: &[&str] = &[
    "article:published_time",
    "article:modified_time",
    "og:updated_time",
    "video:duration",
    "video:release_date",
];

/// Tags every shareable page should carry, reported in `missing` when absent.
const RECOMMENDED: &[&str] = &[
    "og:title",
    "og:description",
    "og:image",
    "og:url",
    "og:type",
    "og:site_name",
    "og:locale",
    "twitter:card",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenGraphBasic {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub og_type: Option<String>,
    pub url: Option<String>,
    pub site_name: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenGraphImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
}

impl OpenGraphImage {
    fn has_dimensions(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenGraphProfile {
    pub basic: OpenGraphBasic,
    pub facebook: BTreeMap<String, String>,
    pub twitter: BTreeMap<String, String>,
    pub article: BTreeMap<String, String>,
    pub video: BTreeMap<String, String>,
    pub images: Vec<OpenGraphImage>,
    /// Weighted tag coverage, 0..=100
    pub completeness: u8,
    pub missing: Vec<String>,
}

/// Extract Open Graph, Facebook, Twitter, article and video metadata.
pub fn extract_open_graph(html: &str, page_url: &Url) -> OpenGraphProfile {
    let document = Html::parse_document(html);
    open_graph(&document, page_url)
}

pub(crate) fn open_graph(document: &Html, page_url: &Url) -> OpenGraphProfile {
    // First value wins for the maps; images are built from every occurrence.
    let mut tags: BTreeMap<String, String> = BTreeMap::new();
    let mut images: Vec<OpenGraphImage> = Vec::new();

    for meta in select_all(document, "meta[content]") {
        let element = meta.value();
        let Some(key) = element.attr("property").or_else(|| element.attr("name")) else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if !OG_PROPERTIES.contains(&key.as_str()) {
            continue;
        }

        let raw = element.attr("content").unwrap_or_default().trim();
        if raw.is_empty() {
            continue;
        }
        let value = if URL_PROPERTIES.contains(&key.as_str()) {
            match resolve_url(page_url, raw) {
                Some(absolute) => absolute,
                None => continue,
            }
        } else {
            raw.to_string()
        };

        record_image_property(&mut images, &key, &value);
        tags.entry(key).or_insert(value);
    }

    dedup_images(&mut images);

    let mut profile = OpenGraphProfile {
        basic: OpenGraphBasic {
            title: tags.get("og:title").cloned(),
            description: tags.get("og:description").cloned(),
            og_type: tags.get("og:type").cloned(),
            url: tags.get("og:url").cloned(),
            site_name: tags.get("og:site_name").cloned(),
            locale: tags.get("og:locale").cloned(),
        },
        images,
        ..OpenGraphProfile::default()
    };

    for (key, value) in &tags {
        let bucket = if key.starts_with("fb:") {
            &mut profile.facebook
        } else if key.starts_with("twitter:") {
            &mut profile.twitter
        } else if key.starts_with("article:") {
            &mut profile.article
        } else if key.starts_with("og:video") || key.starts_with("video:") {
            &mut profile.video
        } else {
            continue;
        };
        bucket.insert(key.clone(), value.clone());
    }

    profile.completeness = completeness(&tags, &profile.images);
    profile.missing = RECOMMENDED
        .iter()
        .filter(|tag| match **tag {
            "og:image" => profile.images.is_empty(),
            other => !tags.contains_key(other),
        })
        .map(|tag| (*tag).to_string())
        .collect();

    profile
}

/// `og:image` / `og:image:url` open a new record; the structured
/// properties that follow attach to the most recent one.
fn record_image_property(images: &mut Vec<OpenGraphImage>, key: &str, value: &str) {
    match key {
        "og:image" | "og:image:url" => images.push(OpenGraphImage {
            url: value.to_string(),
            ..OpenGraphImage::default()
        }),
        "og:image:secure_url" if images.is_empty() => images.push(OpenGraphImage {
            url: value.to_string(),
            ..OpenGraphImage::default()
        }),
        "og:image:width" | "og:image:height" | "og:image:alt" | "og:image:type" => {
            let Some(current) = images.last_mut() else {
                return;
            };
            match key {
                "og:image:width" => current.width = value.parse().ok(),
                "og:image:height" => current.height = value.parse().ok(),
                "og:image:alt" => current.alt = Some(value.to_string()),
                _ => current.mime_type = Some(value.to_string()),
            }
        }
        _ => {}
    }
}

/// Keep the first record per URL, folding in any details a later duplicate adds.
fn dedup_images(images: &mut Vec<OpenGraphImage>) {
    let mut unique: Vec<OpenGraphImage> = Vec::with_capacity(images.len());
    for image in images.drain(..) {
        match unique.iter_mut().find(|seen| seen.url == image.url) {
            Some(seen) => {
                seen.width = seen.width.or(image.width);
                seen.height = seen.height.or(image.height);
                seen.alt = seen.alt.take().or(image.alt);
                seen.mime_type = seen.mime_type.take().or(image.mime_type);
            }
            None => unique.push(image),
        }
    }
    *images = unique;
}

fn completeness(tags: &BTreeMap<String, String>, images: &[OpenGraphImage]) -> u8 {
    let has = |key: &str| tags.contains_key(key);
    let any = |keys: &[&str]| keys.iter().any(|key| tags.contains_key(*key));

    let weighted: [(bool, u32); 12] = [
        (has("og:title"), 15),
        (has("og:description"), 15),
        (!images.is_empty(), 15),
        (has("og:url"), 5),
        (has("og:type"), 5),
        (has("og:site_name"), 5),
        (any(SOCIAL_ID_PROPERTIES), 10),
        (has("twitter:card"), 10),
        (images.len() > 1, 5),
        (any(TIME_PROPERTIES), 10),
        (has("og:locale"), 3),
        (images.iter().any(OpenGraphImage::has_dimensions), 2),
    ];

    let score: u32 = weighted
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum();
    score.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/news/launch").unwrap()
    }

    #[test]
    fn test_no_tags_scores_zero() {
        let html = r#"<html><head><meta name="description" content="plain"></head></html>"#;
        let profile = extract_open_graph(html, &page_url());
        assert_eq!(profile.completeness, 0);
        assert!(profile.images.is_empty());
        assert_eq!(profile.missing.len(), RECOMMENDED.len());
    }

    #[test]
    fn test_full_profile_scores_hundred() {
        let html = r#"<head>
            <meta property="og:title" content="Launch day">
            <meta property="og:description" content="We shipped.">
            <meta property="og:type" content="article">
            <meta property="og:url" content="/news/launch">
            <meta property="og:site_name" content="Example">
            <meta property="og:locale" content="en_US">
            <meta property="og:image" content="/img/a.png">
            <meta property="og:image:width" content="1200">
            <meta property="og:image:height" content="630">
            <meta property="og:image:alt" content="Rocket">
            <meta property="og:image" content="https://cdn.example.com/b.png">
            <meta property="fb:app_id" content="12345">
            <meta name="twitter:card" content="summary_large_image">
            <meta name="twitter:image" content="//cdn.example.com/t.png">
            <meta property="article:published_time" content="2024-05-01T08:00:00Z">
        </head>"#;

        let profile = extract_open_graph(html, &page_url());
        assert_eq!(profile.completeness, 100);
        assert!(profile.missing.is_empty());
        assert_eq!(profile.basic.url.as_deref(), Some("https://example.com/news/launch"));
        assert_eq!(profile.images.len(), 2);
        assert_eq!(profile.images[0].url, "https://example.com/img/a.png");
        assert_eq!(profile.images[0].width, Some(1200));
        assert_eq!(profile.images[0].alt.as_deref(), Some("Rocket"));
        assert_eq!(profile.facebook.get("fb:app_id").map(String::as_str), Some("12345"));
        assert_eq!(
            profile.twitter.get("twitter:image").map(String::as_str),
            Some("https://cdn.example.com/t.png")
        );
        assert!(profile.article.contains_key("article:published_time"));
    }

    #[test]
    fn test_duplicate_images_are_merged() {
        let html = r#"<head>
            <meta property="og:title" content="T">
            <meta property="og:image" content="https://example.com/a.png">
            <meta property="og:image" content="/a.png">
            <meta property="og:image:width" content="800">
            <meta property="og:image:height" content="600">
        </head>"#;

        let profile = extract_open_graph(html, &page_url());
        assert_eq!(profile.images.len(), 1);
        assert!(profile.images[0].has_dimensions());
        // title 15 + image 15 + dimensions 2
        assert_eq!(profile.completeness, 32);
        assert!(profile.missing.contains(&"og:description".to_string()));
        assert!(!profile.missing.contains(&"og:image".to_string()));
    }
}
