//! Audit configuration
//!
//! Every value an audit needs from its environment lives here and is passed
//! into [`crate::audit::Auditor`] explicitly; nothing is process-global.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_ARCHIVE_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";

/// Configuration for one [`crate::audit::Auditor`].
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub user_agent: String,
    pub robots_timeout: Duration,
    pub sitemap_timeout: Duration,
    /// Timeout for the lightweight HEAD probe that precedes a sitemap fetch.
    pub probe_timeout: Duration,
    pub archive_timeout: Duration,
    pub render_timeout: Duration,
    /// Base URL of the archival snapshot index (CDX-style JSON API).
    pub archive_endpoint: String,
    /// Parent directory for per-audit working directories handed to the renderer.
    pub scratch_dir: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "Mozilla/5.0 (compatible; seolens/{})",
                env!("CARGO_PKG_VERSION")
            ),
            robots_timeout: Duration::from_secs(5),
            sitemap_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(3),
            archive_timeout: Duration::from_secs(5),
            render_timeout: Duration::from_secs(15),
            archive_endpoint: DEFAULT_ARCHIVE_ENDPOINT.to_string(),
            scratch_dir: std::env::temp_dir().join("seolens"),
        }
    }
}

impl AuditConfig {
    /// Build a configuration from `SEOLENS_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] when a timeout is not a whole
    /// number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuditConfig::from_env`] but reads through `lookup`, so tests
    /// can feed a map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let seconds = |var: &str, current: Duration| -> Result<Duration, ConfigError> {
            match lookup(var) {
                None => Ok(current),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: e.to_string(),
                    }),
            }
        };

        config.robots_timeout = seconds("SEOLENS_ROBOTS_TIMEOUT_SECS", config.robots_timeout)?;
        config.sitemap_timeout = seconds("SEOLENS_SITEMAP_TIMEOUT_SECS", config.sitemap_timeout)?;
        config.probe_timeout = seconds("SEOLENS_PROBE_TIMEOUT_SECS", config.probe_timeout)?;
        config.archive_timeout = seconds("SEOLENS_ARCHIVE_TIMEOUT_SECS", config.archive_timeout)?;
        config.render_timeout = seconds("SEOLENS_RENDER_TIMEOUT_SECS", config.render_timeout)?;

        if let Some(agent) = lookup("SEOLENS_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(endpoint) = lookup("SEOLENS_ARCHIVE_ENDPOINT") {
            config.archive_endpoint = endpoint;
        }
        if let Some(dir) = lookup("SEOLENS_SCRATCH_DIR") {
            config.scratch_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}
