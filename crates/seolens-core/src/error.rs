use thiserror::Error;

/// Hard failures of a whole audit. Everything else degrades inside its component.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("rendering {url} failed: {reason}")]
    Render { url: String, reason: String },

    #[error("renderer returned an empty document for {url}")]
    EmptyDocument { url: String },

    #[error("scratch directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure of a single network-facing sub-fetch.
///
/// Never escapes its component: callers store the `Display` form in the
/// component's `error` field and fall back to documented defaults.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("not a sitemap: missing <urlset> or <sitemapindex> root")]
    NotASitemap,

    #[error("malformed archive response: {0}")]
    MalformedArchive(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
