//! Domain facts and a best-effort age estimate from an archival snapshot index

use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

pub const UNKNOWN_AGE: &str = "Unknown";

/// Multi-label public suffixes recognised when splitting off the TLD.
const SECOND_LEVEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.nz", "co.jp",
    "com.br", "co.za", "com.mx",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityTier {
    Established,
    Moderate,
    New,
    Unknown,
}

impl AuthorityTier {
    pub fn from_age_years(years: Option<u32>) -> Self {
        match years {
            Some(y) if y >= 3 => Self::Established,
            Some(y) if y >= 1 => Self::Moderate,
            Some(_) => Self::New,
            None => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainProfile {
    pub hostname: String,
    pub tld: String,
    pub is_subdomain: bool,
    /// Human-readable age bucket, or `"Unknown"`
    pub age: String,
    pub age_years: Option<u32>,
    pub first_snapshot: Option<DateTime<Utc>>,
    pub authority: AuthorityTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainProfile {
    /// TLD and subdomain facts only; age unknown.
    pub fn from_url(url: &Url) -> Self {
        let hostname = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let (tld, is_subdomain) = split_host(&hostname);
        Self {
            hostname,
            tld,
            is_subdomain,
            age: UNKNOWN_AGE.to_string(),
            age_years: None,
            first_snapshot: None,
            authority: AuthorityTier::Unknown,
            error: None,
        }
    }

    fn with_first_snapshot(mut self, first: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let months = months_between(first, now);
        let years = months / 12;
        self.age = age_label(months);
        self.age_years = Some(years);
        self.first_snapshot = Some(first);
        self.authority = AuthorityTier::from_age_years(Some(years));
        self
    }
}

/// `(tld, is_subdomain)`; a leading `www.` does not count as a subdomain.
fn split_host(hostname: &str) -> (String, bool) {
    let host = hostname.trim_start_matches("www.");
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    let suffix = SECOND_LEVEL_SUFFIXES
        .iter()
        .find(|suffix| host.ends_with(&format!(".{suffix}")));

    match suffix {
        Some(suffix) => ((*suffix).to_string(), labels.len() > 3),
        None => (
            labels.last().map(|l| (*l).to_string()).unwrap_or_default(),
            labels.len() > 2,
        ),
    }
}

/// Whole calendar months from `first` to `now`, never negative.
pub fn months_between(first: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let mut months =
        (now.year() - first.year()) * 12 + now.month() as i32 - first.month() as i32;
    if now.day() < first.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Bucket an age in months into its display label.
pub fn age_label(months: u32) -> String {
    let years = months / 12;
    match years {
        0 if months < 1 => "Less than 1 month".to_string(),
        0 if months == 1 => "1 month".to_string(),
        0 => format!("{months} months"),
        1 => "1 year".to_string(),
        2..5 => format!("{years} years"),
        5..10 => format!("{years} years (Established)"),
        _ => format!("{years}+ years (Very Established)"),
    }
}

/// Parse a 14-digit `YYYYMMDDHHMMSS` snapshot timestamp.
pub fn parse_snapshot_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// First snapshot timestamp from a `[[header...], [timestamp, ...], ...]` body.
pub fn parse_archive_response(body: &str) -> Result<DateTime<Utc>, FetchError> {
    let rows: JsonValue = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedArchive(e.to_string()))?;

    let raw = rows
        .get(1)
        .and_then(|row| row.get(0))
        .and_then(JsonValue::as_str)
        .ok_or_else(|| FetchError::MalformedArchive("no snapshots recorded".to_string()))?;

    parse_snapshot_timestamp(raw)
        .ok_or_else(|| FetchError::MalformedArchive(format!("bad timestamp {raw:?}")))
}

async fn first_snapshot(
    client: &Client,
    endpoint: &str,
    hostname: &str,
    timeout: Duration,
) -> Result<DateTime<Utc>, FetchError> {
    let response = client
        .get(endpoint)
        .query(&[
            ("url", hostname),
            ("output", "json"),
            ("fl", "timestamp"),
            ("limit", "1"),
        ])
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus {
            status: status.as_u16(),
            url: endpoint.to_string(),
        });
    }

    parse_archive_response(&response.text().await?)
}

/// Profile the audited domain. Never fails: any lookup problem leaves the
/// age `"Unknown"` with the reason in `error`.
pub async fn profile_domain(
    client: &Client,
    page_url: &Url,
    archive_endpoint: &str,
    timeout: Duration,
) -> DomainProfile {
    let profile = DomainProfile::from_url(page_url);
    if profile.hostname.is_empty() {
        return profile;
    }

    match first_snapshot(client, archive_endpoint, &profile.hostname, timeout).await {
        Ok(first) => {
            debug!(hostname = %profile.hostname, %first, "archive snapshot found");
            profile.with_first_snapshot(first, Utc::now())
        }
        Err(error) => {
            warn!(hostname = %profile.hostname, %error, "domain age lookup failed");
            DomainProfile {
                error: Some(error.to_string()),
                ..profile
            }
        }
    }
}
