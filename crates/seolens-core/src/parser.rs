//! HTML page facts and JSON-LD block extraction

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::url_utils::resolve_url;

/// On-page facts read directly from the rendered document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageFacts {
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: Option<String>,
    pub meta_robots: Option<String>,
    /// False when meta robots carries `noindex` or `none`
    pub meta_robots_allows_indexing: bool,
    pub canonical: Option<String>,
    pub lang: Option<String>,
    pub has_viewport: bool,
    pub charset: Option<String>,
    pub h1_count: usize,
    pub h2_count: usize,
    pub h3_count: usize,
    pub h1_texts: Vec<String>,
    pub word_count: usize,
    /// `<link rel="sitemap">` targets, absolute
    pub sitemap_links: Vec<String>,
    #[serde(skip)]
    pub body_text: String,
}

/// Extract JSON-LD script blocks from HTML
pub fn extract_json_ld_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    json_ld_blocks(&document)
}

pub(crate) fn json_ld_blocks(document: &Html) -> Vec<String> {
    select_all(document, "script")
        .into_iter()
        .filter_map(|element| {
            let script_type = element
                .value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();

            // Use contains() to catch variations like "application/ld+json; charset=utf-8"
            if script_type.contains("ld+json") {
                let text = element.text().collect::<String>().trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            } else {
                None
            }
        })
        .collect()
}

/// Sanitize HTML by removing script, style, and other unwanted elements
pub fn sanitize_html(html: &str) -> String {
    static RE_TAG_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?is)<script[^>]*?>[\s\S]*?</script>",
            r"(?is)<style[^>]*?>[\s\S]*?</style>",
            r"(?is)<noscript[^>]*?>[\s\S]*?</noscript>",
            r"(?is)<template[^>]*?>[\s\S]*?</template>",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("invalid block regex"))
        .collect()
    });
    static RE_COMMENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<!--.*?-->").expect("invalid comment regex"));

    let mut clean = html.to_string();
    for re in RE_TAG_BLOCKS.iter() {
        clean = re.replace_all(&clean, "").into_owned();
    }

    RE_COMMENT.replace_all(&clean, "").into_owned()
}

/// Whitespace-normalised visible text of `<body>` (or the whole document).
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(&sanitize_html(html));
    let root = select_all(&document, "body")
        .into_iter()
        .next()
        .unwrap_or_else(|| document.root_element());
    collapse_whitespace(&root.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Helper functions
pub(crate) fn select_all<'a>(document: &'a Html, selector_str: &str) -> Vec<ElementRef<'a>> {
    if let Ok(selector) = Selector::parse(selector_str) {
        document.select(&selector).collect()
    } else {
        Vec::new()
    }
}

fn count_elements(document: &Html, selector_str: &str) -> usize {
    if let Ok(selector) = Selector::parse(selector_str) {
        document.select(&selector).count()
    } else {
        0
    }
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    select_all(document, "meta[name], meta[property], meta[http-equiv]")
        .into_iter()
        .find(|meta| {
            let value = meta.value();
            [value.attr("name"), value.attr("property"), value.attr("http-equiv")]
                .into_iter()
                .flatten()
                .any(|key| key.eq_ignore_ascii_case(name))
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Read title, meta tags, headings and body text from `html`.
pub fn extract_page_facts(html: &str, page_url: &Url) -> PageFacts {
    let document = Html::parse_document(html);
    page_facts(&document, html, page_url)
}

pub(crate) fn page_facts(document: &Html, html: &str, page_url: &Url) -> PageFacts {
    let title = select_all(document, "title")
        .into_iter()
        .next()
        .map(element_text)
        .unwrap_or_default();

    let meta_robots = meta_content(document, "robots");
    let meta_robots_allows_indexing = meta_robots
        .as_deref()
        .map(|value| {
            let value = value.to_ascii_lowercase();
            !value
                .split(',')
                .map(str::trim)
                .any(|directive| directive == "noindex" || directive == "none")
        })
        .unwrap_or(true);

    let links = select_all(document, "link[rel][href]");
    let canonical = links
        .iter()
        .find(|link| has_rel(**link, "canonical"))
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_url(page_url, href));

    let sitemap_links = links
        .iter()
        .filter(|link| has_rel(**link, "sitemap"))
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| resolve_url(page_url, href))
        .collect();

    let lang = select_all(document, "html")
        .into_iter()
        .next()
        .and_then(|root| root.value().attr("lang"))
        .map(str::to_string);

    let charset = select_all(document, "meta[charset]")
        .into_iter()
        .next()
        .and_then(|meta| meta.value().attr("charset"))
        .map(str::to_string);

    let h1_texts: Vec<String> = select_all(document, "h1").into_iter().map(element_text).collect();

    let body_text = visible_text(html);

    PageFacts {
        title,
        meta_description: meta_content(document, "description").unwrap_or_default(),
        meta_keywords: meta_content(document, "keywords"),
        meta_robots,
        meta_robots_allows_indexing,
        canonical,
        lang,
        has_viewport: meta_content(document, "viewport").is_some(),
        charset,
        h1_count: h1_texts.len(),
        h2_count: count_elements(document, "h2"),
        h3_count: count_elements(document, "h3"),
        h1_texts,
        word_count: body_text.split_whitespace().count(),
        sitemap_links,
        body_text,
    }
}

pub(crate) fn has_rel(element: ElementRef<'_>, wanted: &str) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case(wanted))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/shop/boots").unwrap()
    }

    #[test]
    fn test_extract_json_ld_empty_html() {
        let html = "<html><body>No JSON-LD here</body></html>";
        let blocks = extract_json_ld_blocks(html);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_extract_json_ld_with_charset() {
        let html = r#"
            <script type="application/ld+json; charset=utf-8">
            {"@type": "Product", "name": "Test"}
            </script>
        "#;

        let blocks = extract_json_ld_blocks(html);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("Test"));
    }

    #[test]
    fn test_extract_json_ld_case_insensitive() {
        let html = r#"
            <script type="APPLICATION/LD+JSON">
            {"@type": "Product", "name": "Test"}
            </script>
        "#;

        let blocks = extract_json_ld_blocks(html);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_extract_json_ld_empty_script() {
        let html = r#"
            <script type="application/ld+json"></script>
            <script type="application/ld+json">   </script>
        "#;

        let blocks = extract_json_ld_blocks(html);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_sanitize_html_removes_scripts_styles_and_comments() {
        let html = r#"
            <p>Keep this</p>
            <script>alert('remove this')</script>
            <style>body { background: red; }</style>
            <!-- This is a comment -->
        "#;

        let sanitized = sanitize_html(html);
        assert!(sanitized.contains("Keep this"));
        assert!(!sanitized.contains("alert"));
        assert!(!sanitized.contains("background: red"));
        assert!(!sanitized.contains("<!--"));
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let html = r#"<html><head><title>T</title></head>
            <body><h1>Hello</h1>  <script>var x = 1;</script><p>big   world</p></body></html>"#;
        assert_eq!(visible_text(html), "Hello big world");
    }

    #[test]
    fn test_page_facts() {
        let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>  Leather Boots | Example </title>
  <meta name="description" content="Hand-made leather boots.">
  <meta name="viewport" content="width=device-width">
  <meta name="ROBOTS" content="index, follow">
  <link rel="canonical" href="/shop/boots">
  <link rel="sitemap" type="application/xml" href="/sitemap.xml">
</head>
<body>
  <h1>Leather Boots</h1>
  <h2>Sizes</h2><h2>Care</h2>
  <p>Built to last for years.</p>
</body>
</html>"#;

        let facts = extract_page_facts(html, &page_url());
        assert_eq!(facts.title, "Leather Boots | Example");
        assert_eq!(facts.meta_description, "Hand-made leather boots.");
        assert!(facts.meta_robots_allows_indexing);
        assert_eq!(facts.canonical.as_deref(), Some("https://example.com/shop/boots"));
        assert_eq!(facts.sitemap_links, vec!["https://example.com/sitemap.xml"]);
        assert_eq!(facts.lang.as_deref(), Some("en"));
        assert_eq!(facts.charset.as_deref(), Some("utf-8"));
        assert!(facts.has_viewport);
        assert_eq!(facts.h1_count, 1);
        assert_eq!(facts.h2_count, 2);
        assert_eq!(facts.h1_texts, vec!["Leather Boots"]);
        assert_eq!(facts.word_count, 9);
    }

    #[test]
    fn test_noindex_meta_robots() {
        let html = r#"<head><meta name="robots" content="NOINDEX, nofollow"></head>"#;
        let facts = extract_page_facts(html, &page_url());
        assert!(!facts.meta_robots_allows_indexing);
        assert_eq!(facts.title, "");
    }
}
