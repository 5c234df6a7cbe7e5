//! Geolocation-based fallback classification.
//!
//! Consulted only when no address rule matched. A single outbound
//! lookup, bounded by a short timeout, yields a region code; the
//! policy combines that with a locale hint from the request. Every
//! lookup failure degrades to the locale-only heuristic, never to an
//! unconditional allow or block.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, warn};

use anyhow::{Context, Result};

/// Default lookup timeout in seconds.
pub const GEO_TIMEOUT_SECS: u64 = 2;

/// Reserved region codes that are blocked regardless of locale:
/// the unknown-region marker plus three sensitive administrative
/// regions, preserving the legacy policy. Overridable via config.
pub const DEFAULT_BLOCKED_REGIONS: &[&str] = &["unknown", "TW", "HK", "MO"];

/// Default locale marker for the fallback heuristic.
pub const DEFAULT_LOCALE_MARKER: &str = "zh";

/// Outcome of one region lookup.
///
/// Transport errors, timeouts, bad status codes, undecodable bodies,
/// and missing fields all collapse into `Unavailable`: the caller's
/// fallback is identical regardless of cause, so the cause is logged
/// here and not propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionLookupResult {
    /// The service answered with a region code.
    Region(String),
    /// The service could not be consulted or could not be decoded.
    Unavailable,
}

/// Backend that resolves an address to a region code.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    async fn lookup(&self, addr: Ipv4Addr) -> RegionLookupResult;
}

/// Expected response body from the geolocation endpoint.
#[derive(Debug, Deserialize)]
struct GeoResponse {
    region: Option<String>,
}

/// HTTP region lookup against a configurable endpoint.
///
/// The endpoint URL may carry an `{ip}` placeholder; without one the
/// address is appended as a final path segment. One attempt, no
/// retries; the whole request is bounded by the client timeout.
pub struct HttpRegionLookup {
    client: Client,
    endpoint: String,
}

impl HttpRegionLookup {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("ipgate/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn url_for(&self, addr: Ipv4Addr) -> String {
        if self.endpoint.contains("{ip}") {
            self.endpoint.replace("{ip}", &addr.to_string())
        } else {
            format!("{}/{}", self.endpoint.trim_end_matches('/'), addr)
        }
    }
}

#[async_trait]
impl RegionLookup for HttpRegionLookup {
    async fn lookup(&self, addr: Ipv4Addr) -> RegionLookupResult {
        let url = self.url_for(addr);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Geo lookup failed for {}: {}", addr, e);
                return RegionLookupResult::Unavailable;
            }
        };
        if !response.status().is_success() {
            warn!("Geo lookup for {} returned HTTP {}", addr, response.status());
            return RegionLookupResult::Unavailable;
        }
        match response.json::<GeoResponse>().await {
            Ok(GeoResponse { region: Some(code) }) => RegionLookupResult::Region(code),
            Ok(GeoResponse { region: None }) => {
                warn!("Geo response for {} carried no region field", addr);
                RegionLookupResult::Unavailable
            }
            Err(e) => {
                warn!("Undecodable geo response for {}: {}", addr, e);
                RegionLookupResult::Unavailable
            }
        }
    }
}

/// Regional block policy applied to lookup results.
#[derive(Debug, Clone)]
pub struct GeoPolicy {
    /// Region codes blocked regardless of locale.
    pub blocked_regions: Vec<String>,
    /// Case-insensitive substring marking an allowed-by-default locale.
    pub locale_marker: String,
    /// Whether addresses without the locale marker are blocked by
    /// default when no blocked region applies. When false the policy
    /// only blocks the reserved regions.
    pub block_unmarked: bool,
}

impl Default for GeoPolicy {
    fn default() -> Self {
        Self {
            blocked_regions: DEFAULT_BLOCKED_REGIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            locale_marker: DEFAULT_LOCALE_MARKER.to_string(),
            block_unmarked: true,
        }
    }
}

impl GeoPolicy {
    /// Case-insensitive substring test for the locale marker.
    fn locale_is_marked(&self, locale: &str) -> bool {
        locale
            .to_lowercase()
            .contains(&self.locale_marker.to_lowercase())
    }

    /// The locale-only heuristic used when no region verdict applies.
    fn fallback_block(&self, locale: &str) -> bool {
        self.block_unmarked && !self.locale_is_marked(locale)
    }
}

/// Applies a [`GeoPolicy`] to the result of a region lookup.
pub struct GeoClassifier {
    lookup: Box<dyn RegionLookup>,
    policy: GeoPolicy,
}

impl GeoClassifier {
    pub fn new(lookup: Box<dyn RegionLookup>, policy: GeoPolicy) -> Self {
        Self { lookup, policy }
    }

    /// The locale-only verdict, for callers with no address to look up.
    pub fn fallback_verdict(&self, locale: &str) -> bool {
        self.policy.fallback_block(locale)
    }

    /// Block verdict for one address given the request's locale hint.
    pub async fn classify(&self, addr: Ipv4Addr, locale: &str) -> bool {
        match self.lookup.lookup(addr).await {
            RegionLookupResult::Region(code) => {
                if self.policy.blocked_regions.iter().any(|r| r == &code) {
                    debug!("{} resolved to blocked region {}", addr, code);
                    true
                } else {
                    self.policy.fallback_block(locale)
                }
            }
            RegionLookupResult::Unavailable => self.policy.fallback_block(locale),
        }
    }
}
