//! Image inventory: alt-text coverage and lazy loading

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::parser::select_all;
use crate::url_utils::resolve_url;

pub const MAX_LISTED_IMAGES: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRecord {
    /// Absolute URL; `None` when `src` was missing or unresolvable
    pub src: Option<String>,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub lazy: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageInventory {
    pub total_images: usize,
    pub images_with_alt: usize,
    /// `alt=""`, intentionally hidden from assistive technology
    pub decorative_images: usize,
    pub images_missing_alt: usize,
    pub lazy_loaded: usize,
    pub images: Vec<ImageRecord>,
}

pub fn inventory_images(html: &str, page_url: &Url) -> ImageInventory {
    let document = Html::parse_document(html);
    images(&document, page_url)
}

pub(crate) fn images(document: &Html, page_url: &Url) -> ImageInventory {
    let mut inventory = ImageInventory::default();

    for img in select_all(document, "img") {
        let element = img.value();
        let alt = element.attr("alt").map(str::trim);
        let lazy = element
            .attr("loading")
            .is_some_and(|loading| loading.eq_ignore_ascii_case("lazy"));

        inventory.total_images += 1;
        match alt {
            Some("") => {
                inventory.images_with_alt += 1;
                inventory.decorative_images += 1;
            }
            Some(_) => inventory.images_with_alt += 1,
            None => inventory.images_missing_alt += 1,
        }
        if lazy {
            inventory.lazy_loaded += 1;
        }

        if inventory.images.len() < MAX_LISTED_IMAGES {
            let src = element
                .attr("src")
                .or_else(|| element.attr("data-src"))
                .and_then(|src| resolve_url(page_url, src));
            inventory.images.push(ImageRecord {
                src,
                alt: alt.map(str::to_string),
                width: element.attr("width").map(str::to_string),
                height: element.attr("height").map(str::to_string),
                lazy,
            });
        }
    }

    inventory
}
