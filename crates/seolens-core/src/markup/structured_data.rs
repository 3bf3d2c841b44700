//! JSON-LD structured data classification

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Schema.org type names that set each flag.
const ORGANIZATION_TYPES: &[&str] = &["Organization", "LocalBusiness"];
const ARTICLE_TYPES: &[&str] = &["Article", "NewsArticle"];
const PRODUCT_TYPES: &[&str] = &["Product", "Service"];
const BREADCRUMB_TYPES: &[&str] = &["BreadcrumbList"];
const RATING_FIELDS: &[&str] = &["aggregateRating", "rating"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredData {
    /// JSON-LD blocks that parsed as JSON
    pub schemas_found: usize,
    /// Observed `@type` values, de-duplicated in first-seen order
    pub types: Vec<String>,
    pub has_organization: bool,
    pub has_article: bool,
    pub has_product: bool,
    pub has_breadcrumb: bool,
    pub has_rating: bool,
    /// Blocks skipped because they were not valid JSON
    pub invalid_blocks: usize,
}

impl StructuredData {
    fn observe(&mut self, node: &JsonValue) {
        match node {
            JsonValue::Array(items) => items.iter().for_each(|item| self.observe(item)),
            JsonValue::Object(map) => {
                if let Some(type_name) = map.get("@type").and_then(first_type) {
                    self.has_organization |= ORGANIZATION_TYPES.contains(&type_name);
                    self.has_article |= ARTICLE_TYPES.contains(&type_name);
                    self.has_product |= PRODUCT_TYPES.contains(&type_name);
                    self.has_breadcrumb |= BREADCRUMB_TYPES.contains(&type_name);
                    if !self.types.iter().any(|seen| seen == type_name) {
                        self.types.push(type_name.to_string());
                    }
                }
                if RATING_FIELDS.iter().any(|field| map.contains_key(*field)) {
                    self.has_rating = true;
                }
                if let Some(graph) = map.get("@graph") {
                    self.observe(graph);
                }
            }
            _ => {}
        }
    }
}

/// `@type` may be a string or an array of strings; arrays use their first value.
fn first_type(value: &JsonValue) -> Option<&str> {
    match value {
        JsonValue::String(name) => Some(name.as_str()),
        JsonValue::Array(names) => names.first().and_then(JsonValue::as_str),
        _ => None,
    }
}

/// Classify every JSON-LD block independently. A block that fails to parse is
/// counted in `invalid_blocks` and otherwise ignored.
pub fn analyze_structured_data<S: AsRef<str>>(blocks: &[S]) -> StructuredData {
    let mut data = StructuredData::default();

    for block in blocks {
        match serde_json::from_str::<JsonValue>(block.as_ref()) {
            Ok(parsed) => {
                data.schemas_found += 1;
                data.observe(&parsed);
            }
            Err(error) => {
                debug!(%error, "skipping malformed JSON-LD block");
                data.invalid_blocks += 1;
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_block_is_skipped() {
        let blocks = [r#"{"@type":"Organization"}"#, r#"{"@type": "Product", "name": "#];

        let data = analyze_structured_data(&blocks);
        assert_eq!(data.schemas_found, 1);
        assert_eq!(data.invalid_blocks, 1);
        assert!(data.has_organization);
        assert!(!data.has_product);
        assert_eq!(data.types, vec!["Organization"]);
    }

    #[test]
    fn test_graph_arrays_and_type_arrays() {
        let blocks = [
            r#"{
                "@context": "https://schema.org",
                "@graph": [
                    {"@type": ["NewsArticle", "Article"], "headline": "Hi"},
                    {"@type": "BreadcrumbList", "itemListElement": []}
                ]
            }"#,
            r#"[
                {"@type": "Service", "aggregateRating": {"ratingValue": 4.5}},
                {"@type": "LocalBusiness"},
                {"@type": "LocalBusiness"}
            ]"#,
        ];

        let data = analyze_structured_data(&blocks);
        assert_eq!(data.schemas_found, 2);
        assert!(data.has_article);
        assert!(data.has_breadcrumb);
        assert!(data.has_product);
        assert!(data.has_rating);
        assert!(data.has_organization);
        assert_eq!(
            data.types,
            vec!["NewsArticle", "BreadcrumbList", "Service", "LocalBusiness"]
        );
    }

    #[test]
    fn test_no_blocks() {
        let data = analyze_structured_data::<&str>(&[]);
        assert_eq!(data, StructuredData::default());
    }
}
