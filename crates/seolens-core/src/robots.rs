//! Robots.txt parser and path policy evaluation
//!
//! Only the wildcard (`*`) user-agent group is honoured. Rules keep the order
//! they appeared in the file; precedence between them is decided by prefix
//! length in [`is_allowed`], never by position.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;
use crate::url_utils::{normalize_origin, resolve_url};

/// Crawl policy published at `/robots.txt` for the wildcard user agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotsPolicy {
    /// Whether robots.txt was fetched successfully
    pub exists: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Disallowed path prefixes, in file order
    pub disallow_rules: Vec<String>,

    /// Allowed path prefixes, in file order
    pub allow_rules: Vec<String>,

    /// Empty `Disallow:` or `Disallow: /` seen in the wildcard group
    pub blocks_all: bool,

    /// Empty `Allow:` or `Allow: /` seen in the wildcard group
    pub allows_all: bool,

    /// Absolute sitemap URLs, de-duplicated in first-seen order
    pub sitemap_urls: Vec<String>,

    pub crawl_delay: Option<u32>,

    /// The audited page may be indexed under this policy
    pub allows_indexing: bool,

    pub current_path_allowed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for RobotsPolicy {
    fn default() -> Self {
        Self::absent(None, None)
    }
}

impl RobotsPolicy {
    /// Permissive policy used when robots.txt is missing or unreachable.
    ///
    /// A missing file never blocks anything.
    pub fn absent(status_code: Option<u16>, error: Option<String>) -> Self {
        Self {
            exists: false,
            status_code,
            disallow_rules: Vec::new(),
            allow_rules: Vec::new(),
            blocks_all: false,
            allows_all: false,
            sitemap_urls: Vec::new(),
            crawl_delay: None,
            allows_indexing: true,
            current_path_allowed: true,
            error,
        }
    }

    /// Check `path` against the blanket flags and the prefix rules.
    pub fn is_path_allowed(&self, path: &str) -> bool {
        if self.blocks_all && !self.allows_all {
            // A blanket disallow is the shortest possible rule, so any matching
            // allow prefix longer than "/" overrides it.
            let rescued = self
                .allow_rules
                .iter()
                .any(|allow| allow.len() > 1 && path.starts_with(allow.as_str()));
            if !rescued {
                return false;
            }
        }
        is_allowed(path, &self.disallow_rules, &self.allow_rules)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentCursor {
    None,
    Wildcard,
    Named,
}

/// Parse robots.txt content and evaluate the path of `page_url` against it.
///
/// `Sitemap:` values are resolved against `page_url`; unresolvable ones are dropped.
pub fn parse_robots_txt(content: &str, page_url: &Url) -> RobotsPolicy {
    let mut policy = RobotsPolicy {
        exists: true,
        status_code: Some(200),
        ..RobotsPolicy::absent(None, None)
    };

    let mut cursor = AgentCursor::None;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };

        let directive = directive.trim().to_ascii_lowercase();
        // Inline comments are not part of the value
        let value = value.split('#').next().unwrap_or_default().trim();

        match directive.as_str() {
            "user-agent" => {
                cursor = if value == "*" {
                    AgentCursor::Wildcard
                } else {
                    AgentCursor::Named
                };
            }
            "sitemap" => {
                // Sitemap lines are not tied to any group
                let raw = line.split_once(':').map(|(_, v)| v.trim()).unwrap_or_default();
                if let Some(url) = resolve_url(page_url, raw) {
                    if !policy.sitemap_urls.contains(&url) {
                        policy.sitemap_urls.push(url);
                    }
                }
            }
            _ if cursor != AgentCursor::Wildcard => {}
            "disallow" => match value {
                "" | "/" => policy.blocks_all = true,
                path => policy.disallow_rules.push(path.to_string()),
            },
            "allow" => match value {
                "" | "/" => policy.allows_all = true,
                path => policy.allow_rules.push(path.to_string()),
            },
            "crawl-delay" => {
                if let Ok(delay) = value.parse::<u32>() {
                    policy.crawl_delay = Some(delay);
                }
            }
            _ => {}
        }
    }

    policy.current_path_allowed = policy.is_path_allowed(page_url.path());
    policy.allows_indexing = policy.current_path_allowed;
    policy
}

/// Decide whether `path` may be crawled under the given prefix rules.
///
/// Allowed by default. Every disallow prefix matching `path` blocks it unless
/// an allow prefix that also matches is strictly longer than that disallow.
pub fn is_allowed<S: AsRef<str>>(path: &str, disallow_rules: &[S], allow_rules: &[S]) -> bool {
    disallow_rules
        .iter()
        .map(AsRef::as_ref)
        .filter(|rule| path.starts_with(rule))
        .all(|rule| {
            allow_rules
                .iter()
                .map(AsRef::as_ref)
                .any(|allow| path.starts_with(allow) && allow.len() > rule.len())
        })
}

/// Fetch `/robots.txt` for the origin of `page_url` and parse it.
///
/// Never fails: a non-2xx answer or a transport error yields
/// [`RobotsPolicy::absent`] with the reason recorded.
pub async fn fetch_robots_policy(
    client: &Client,
    page_url: &Url,
    timeout: Duration,
) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", normalize_origin(page_url.as_str()));
    debug!(%robots_url, "fetching robots.txt");

    match fetch_text(client, &robots_url, timeout).await {
        Ok(body) => parse_robots_txt(&body, page_url),
        Err(FetchError::UnexpectedStatus { status, .. }) => {
            debug!(%robots_url, status, "robots.txt not available");
            RobotsPolicy::absent(Some(status), None)
        }
        Err(error) => {
            warn!(%robots_url, %error, "robots.txt unreachable, assuming permissive policy");
            RobotsPolicy::absent(None, Some(error.to_string()))
        }
    }
}

pub(crate) async fn fetch_text(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    let response = client.get(url).timeout(timeout).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}
