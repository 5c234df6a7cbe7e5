//! Access decision engine: cache, rules, then geo fallback.

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use crate::cache::DecisionCache;
use crate::config::GateConfig;
use crate::geo::{GeoClassifier, HttpRegionLookup, RegionLookup};
use crate::matcher::{self, CompiledMatcher};

/// Orchestrates one block/allow evaluation per incoming address.
///
/// Rules are compiled once at construction and immutable afterward,
/// so rule matching is a pure function of the address. The geo lookup
/// is the only I/O and is consulted only when no rule matched; its
/// verdict is folded into the cached decision, making the end-to-end
/// answer for an address stable for the cache TTL window.
pub struct AccessGate {
    matchers: Vec<CompiledMatcher>,
    geo: GeoClassifier,
    cache: DecisionCache,
    ttl: Duration,
}

impl AccessGate {
    /// Build a gate from configuration, using the HTTP region lookup.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let lookup = HttpRegionLookup::new(&config.geo.endpoint, config.geo_timeout())?;
        Ok(Self::with_lookup(config, Box::new(lookup)))
    }

    /// Build a gate with a caller-supplied region lookup backend.
    pub fn with_lookup(config: &GateConfig, lookup: Box<dyn RegionLookup>) -> Self {
        Self {
            matchers: config.matchers(),
            geo: GeoClassifier::new(lookup, config.geo_policy()),
            cache: DecisionCache::new(),
            ttl: config.cache_ttl(),
        }
    }

    /// Number of compiled rule matchers.
    pub fn rule_count(&self) -> usize {
        self.matchers.len()
    }

    /// Decide whether a request from `addr` should be blocked.
    ///
    /// Consults the cache first; on a miss, a rule hit blocks without
    /// ever querying the geo service, and only a rule miss falls
    /// through to geo classification. The fresh decision is cached for
    /// the configured TTL. Safe to call concurrently; two concurrent
    /// evaluations of the same address may both query the geo service,
    /// which is tolerated (last writer wins with an identical verdict).
    pub async fn should_block(&self, addr: &str, locale: &str) -> bool {
        if let Some(cached) = self.cache.get(addr) {
            debug!("Cache hit for {}: block={}", addr, cached);
            return cached;
        }

        let decision = if matcher::matches_any(addr, &self.matchers) {
            debug!("Rule match for {}", addr);
            true
        } else {
            match addr.trim().parse() {
                Ok(ip) => self.geo.classify(ip, locale).await,
                // Not a dotted-quad: rules cannot apply, but the geo
                // fallback heuristic still can.
                Err(_) => self.geo.fallback_verdict(locale),
            }
        };

        self.cache.set(addr, decision, self.ttl);
        debug!("Decision for {}: block={}", addr, decision);
        decision
    }
}
