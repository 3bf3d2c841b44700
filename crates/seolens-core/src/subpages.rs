//! Robots/sitemap consistency checks for conventional site paths

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::robots::RobotsPolicy;

/// Conventional paths probed on every audit.
pub const SUBPAGE_CATALOGUE: &[&str] = &[
    "/admin",
    "/wp-admin",
    "/login",
    "/dashboard",
    "/category/example",
    "/blog",
    "/products",
    "/services",
    "/contact",
    "/about",
    "/search",
    "/api",
    "/user/profile",
    "/cart",
    "/checkout",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PathClass {
    AdminLike,
    ContentLike,
    Important,
    Other,
}

/// Ordered substring rules; the first matching row wins.
const PATH_CLASS_RULES: &[(PathClass, &[&str])] = &[
    (
        PathClass::AdminLike,
        &["admin", "login", "dashboard", "user", "cart", "checkout"],
    ),
    (PathClass::ContentLike, &["category", "blog", "product"]),
    (PathClass::Important, &["services", "contact", "about"]),
];

pub fn classify_path(path: &str) -> PathClass {
    let lower = path.to_ascii_lowercase();
    PATH_CLASS_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lower.contains(needle)))
        .map(|(class, _)| *class)
        .unwrap_or(PathClass::Other)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ProperlyConfigured,
    ShouldBeBlocked,
    ShouldBeIncludedInSitemap,
    ShouldBeAllowedInRobots,
    ConsiderAddingToSitemap,
    ReviewBlockingRules,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ProperlyConfigured => "properly configured",
            Self::ShouldBeBlocked => "should be blocked",
            Self::ShouldBeIncludedInSitemap => "should be included in sitemap",
            Self::ShouldBeAllowedInRobots => "should be allowed in robots.txt",
            Self::ConsiderAddingToSitemap => "consider adding to sitemap",
            Self::ReviewBlockingRules => "review blocking rules",
        };
        f.write_str(text)
    }
}

/// Decision table: path class x (robots allowed, listed in a sitemap).
pub fn recommend(class: PathClass, allowed: bool, listed: bool) -> Recommendation {
    use Recommendation::*;

    match (class, allowed, listed) {
        (PathClass::AdminLike, true, _) => ShouldBeBlocked,
        (PathClass::AdminLike, false, _) => ProperlyConfigured,
        (PathClass::ContentLike, true, true) => ProperlyConfigured,
        (PathClass::ContentLike, true, false) => ShouldBeIncludedInSitemap,
        (PathClass::ContentLike, false, _) => ShouldBeAllowedInRobots,
        (PathClass::Important, true, true) => ProperlyConfigured,
        (PathClass::Important, true, false) => ConsiderAddingToSitemap,
        (PathClass::Important, false, _) => ShouldBeAllowedInRobots,
        (PathClass::Other, true, _) => ProperlyConfigured,
        (PathClass::Other, false, _) => ReviewBlockingRules,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubpageProbe {
    pub path: String,
    pub class: PathClass,
    pub robots_allowed: bool,
    pub in_sitemap: bool,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubpageSummary {
    pub checked: usize,
    pub allowed: usize,
    pub in_sitemap: usize,
    pub properly_configured: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubpageAudit {
    pub probes: Vec<SubpageProbe>,
    pub summary: SubpageSummary,
}

/// Whether `path` is one of the sitemap locations, exactly or as a parent
/// path segment (`/blog` matches `/blog/first-post` but not `/blogroll`).
pub fn listed_in_sitemap<'a>(path: &str, locations: impl IntoIterator<Item = &'a str>) -> bool {
    let path = path.trim_end_matches('/');
    locations.into_iter().any(|location| {
        let Ok(url) = Url::parse(location) else {
            return false;
        };
        let listed = url.path().trim_end_matches('/');
        listed == path
            || listed
                .strip_prefix(path)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Run every catalogue path through the robots policy and sitemap listing.
pub fn audit_subpages<'a>(
    policy: &RobotsPolicy,
    sitemap_locations: impl IntoIterator<Item = &'a str>,
) -> SubpageAudit {
    let locations: Vec<&str> = sitemap_locations.into_iter().collect();
    let mut audit = SubpageAudit::default();

    for path in SUBPAGE_CATALOGUE {
        let class = classify_path(path);
        let robots_allowed = policy.is_path_allowed(path);
        let in_sitemap = listed_in_sitemap(path, locations.iter().copied());
        let recommendation = recommend(class, robots_allowed, in_sitemap);

        audit.summary.checked += 1;
        if robots_allowed {
            audit.summary.allowed += 1;
        }
        if in_sitemap {
            audit.summary.in_sitemap += 1;
        }
        if recommendation == Recommendation::ProperlyConfigured {
            audit.summary.properly_configured += 1;
        }

        audit.probes.push(SubpageProbe {
            path: (*path).to_string(),
            class,
            robots_allowed,
            in_sitemap,
            recommendation,
        });
    }

    audit
}
