//! On-page markup extractors
//!
//! Each extractor reads one already-parsed document; none of them fetch.
//! [`extract_markup`] parses once and runs them all.

pub mod hreflang;
pub mod images;
pub mod links;
pub mod open_graph;
pub mod structured_data;

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

pub use hreflang::{HreflangEntry, HreflangSet, HreflangSource, extract_hreflang};
pub use images::{ImageInventory, ImageRecord, inventory_images};
pub use links::{LinkAnalysis, LinkRecord, SocialLink, analyze_links, social_platform};
pub use open_graph::{OpenGraphBasic, OpenGraphImage, OpenGraphProfile, extract_open_graph};
pub use structured_data::{StructuredData, analyze_structured_data};

use crate::parser::{PageFacts, json_ld_blocks, page_facts};

/// Everything read from the rendered document itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageMarkup {
    pub facts: PageFacts,
    pub structured_data: StructuredData,
    pub open_graph: OpenGraphProfile,
    pub hreflang: HreflangSet,
    pub links: LinkAnalysis,
    pub images: ImageInventory,
}

/// Parse `html` once and run every extractor over it.
pub fn extract_markup(html: &str, page_url: &Url) -> PageMarkup {
    let document = Html::parse_document(html);

    PageMarkup {
        facts: page_facts(&document, html, page_url),
        structured_data: analyze_structured_data(&json_ld_blocks(&document)),
        open_graph: open_graph::open_graph(&document, page_url),
        hreflang: hreflang::hreflang(&document, page_url),
        links: links::links(&document, page_url),
        images: images::images(&document, page_url),
    }
}
