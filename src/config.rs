//! Configuration for the access gate.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::geo::{GeoPolicy, DEFAULT_BLOCKED_REGIONS, DEFAULT_LOCALE_MARKER, GEO_TIMEOUT_SECS};
use crate::matcher::CompiledMatcher;
use crate::rules;

/// Default decision TTL in seconds.
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Raw rule text, one rule per line (exact, range, wildcard, CIDR).
    pub rules: String,

    /// Seconds a cached decision stays valid.
    pub cache_ttl_secs: u64,

    /// Geolocation lookup and regional policy.
    pub geo: GeoSettings,

    /// Where the host redirects blocked clients. Optional; the host
    /// falls back to its default destination when unset or invalid.
    pub redirect_url: Option<String>,
}

/// Geolocation service settings and block policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoSettings {
    /// Lookup endpoint; `{ip}` is replaced with the client address.
    pub endpoint: String,

    /// Lookup timeout in seconds.
    pub timeout_secs: u64,

    /// Region codes blocked regardless of locale.
    pub blocked_regions: Vec<String>,

    /// Case-insensitive locale substring marking allowed-by-default
    /// clients.
    pub locale_marker: String,

    /// Block clients without the locale marker when the region is not
    /// in the blocked set or could not be determined.
    pub block_unmarked: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            rules: String::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            geo: GeoSettings::default(),
            redirect_url: None,
        }
    }
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://geo.example.com/region/{ip}".to_string(),
            timeout_secs: GEO_TIMEOUT_SECS,
            blocked_regions: DEFAULT_BLOCKED_REGIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            locale_marker: DEFAULT_LOCALE_MARKER.to_string(),
            block_unmarked: true,
        }
    }
}

impl GateConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: GateConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Rule text is deliberately not validated here: malformed rule
    /// lines are skipped at compile time, not configuration errors.
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("cache_ttl_secs must be nonzero");
        }
        if self.geo.timeout_secs == 0 {
            anyhow::bail!("geo.timeout_secs must be nonzero");
        }
        validate_http_url(&self.geo.endpoint)
            .with_context(|| format!("Invalid geo endpoint: {}", self.geo.endpoint))?;
        Ok(())
    }

    /// Compile the configured rule text into matchers.
    pub fn matchers(&self) -> Vec<CompiledMatcher> {
        rules::compile(&self.rules)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_secs(self.geo.timeout_secs)
    }

    pub fn geo_policy(&self) -> GeoPolicy {
        GeoPolicy {
            blocked_regions: self.geo.blocked_regions.clone(),
            locale_marker: self.geo.locale_marker.clone(),
            block_unmarked: self.geo.block_unmarked,
        }
    }
}

/// Require an absolute http(s) URL.
pub(crate) fn validate_http_url(raw: &str) -> Result<Url> {
    let url: Url = raw.parse().context("not a well-formed absolute URL")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("URL scheme must be http or https, got '{}'", url.scheme());
    }
    Ok(url)
}
