//! Integration tests for ipgate.
//!
//! These exercise the full decision flow through the public API with
//! a scripted region lookup, so no network access is needed.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ipgate::config::GateConfig;
use ipgate::engine::AccessGate;
use ipgate::geo::{RegionLookup, RegionLookupResult};
use ipgate::redirect::resolve_redirect_target;

/// Region lookup double that replays a fixed result and counts calls.
struct ScriptedLookup {
    result: RegionLookupResult,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    fn region(code: &str) -> Arc<Self> {
        Arc::new(Self {
            result: RegionLookupResult::Region(code.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            result: RegionLookupResult::Unavailable,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Local newtype so the foreign `RegionLookup` trait can be
/// implemented for a shared `ScriptedLookup` without tripping the
/// orphan rule.
struct ScriptedHandle(Arc<ScriptedLookup>);

#[async_trait]
impl RegionLookup for ScriptedHandle {
    async fn lookup(&self, _addr: Ipv4Addr) -> RegionLookupResult {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0.result.clone()
    }
}

fn gate_with(rules: &str, lookup: &Arc<ScriptedLookup>) -> AccessGate {
    let config = GateConfig {
        rules: rules.to_string(),
        ..GateConfig::default()
    };
    AccessGate::with_lookup(&config, Box::new(ScriptedHandle(Arc::clone(lookup))))
}

#[tokio::test]
async fn test_all_rule_forms_block_without_geo() {
    let lookup = ScriptedLookup::unavailable();
    let gate = gate_with(
        "# operator rules\n\
         192.168.1.1-20\n\
         222.34.4.*\n\
         218.192.104.0/24\n\
         203.0.113.99\n",
        &lookup,
    );

    for addr in [
        "192.168.1.1",
        "192.168.1.20",
        "222.34.4.0",
        "222.34.4.255",
        "218.192.104.0",
        "218.192.104.255",
        "203.0.113.99",
    ] {
        assert!(gate.should_block(addr, "zh-CN").await, "expected block: {}", addr);
    }
    assert_eq!(lookup.calls(), 0, "rule hits must never consult geo");
}

#[tokio::test]
async fn test_rule_boundaries_fall_through_to_geo() {
    let lookup = ScriptedLookup::region("CN-44");
    let gate = gate_with("192.168.1.1-20\n218.192.104.0/24\n", &lookup);

    // Just outside each rule, with an allowed region and marked locale.
    for addr in ["192.168.1.0", "192.168.1.21", "218.192.105.0"] {
        assert!(!gate.should_block(addr, "zh-CN,zh;q=0.9").await, "{}", addr);
    }
    assert_eq!(lookup.calls(), 3);
}

#[tokio::test]
async fn test_geo_failure_degrades_to_locale_heuristic() {
    let lookup = ScriptedLookup::unavailable();
    let gate = gate_with("", &lookup);

    assert!(gate.should_block("203.0.113.1", "en-US,en;q=0.9").await);
    assert!(!gate.should_block("203.0.113.2", "zh-CN,zh;q=0.9").await);
}

#[tokio::test]
async fn test_reserved_region_blocks_regardless_of_locale() {
    for code in ["unknown", "TW", "HK", "MO"] {
        let lookup = ScriptedLookup::region(code);
        let gate = gate_with("", &lookup);
        assert!(gate.should_block("203.0.113.1", "zh-CN").await, "{}", code);
    }
}

#[tokio::test]
async fn test_verdict_cached_within_ttl() {
    let lookup = ScriptedLookup::region("CN-11");
    let gate = gate_with("", &lookup);

    assert!(!gate.should_block("203.0.113.1", "zh-CN").await);
    // Repeat lookups are served from cache; the scripted service sees
    // exactly one query even when the locale changes.
    for _ in 0..5 {
        assert!(!gate.should_block("203.0.113.1", "en-US").await);
    }
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_evaluations_across_addresses() {
    let lookup = ScriptedLookup::unavailable();
    let gate = Arc::new(gate_with("10.0.0.0/8", &lookup));

    let mut tasks = Vec::new();
    for i in 0..16u8 {
        let gate = Arc::clone(&gate);
        tasks.push(tokio::spawn(async move {
            let ruled = format!("10.1.2.{}", i);
            let geo = format!("203.0.113.{}", i);
            let a = gate.should_block(&ruled, "en-US").await;
            let b = gate.should_block(&geo, "zh-CN").await;
            (a, b)
        }));
    }
    for task in tasks {
        let (ruled, geo) = task.await.unwrap();
        assert!(ruled, "rule-covered address must block");
        assert!(!geo, "marked locale with unavailable geo must pass");
    }
}

#[tokio::test]
async fn test_malformed_rules_do_not_poison_the_gate() {
    let lookup = ScriptedLookup::unavailable();
    let gate = gate_with("999.1.1.1\n10.0.0.0/abc\n192.168.1.0/24\n", &lookup);

    assert_eq!(gate.rule_count(), 1);
    assert!(gate.should_block("192.168.1.5", "zh-CN").await);
    assert_eq!(lookup.calls(), 0);
}

#[test]
fn test_blocked_request_redirect_resolution() {
    // Valid configured destination wins.
    let url = resolve_redirect_target(
        Some("https://landing.example.com/blocked"),
        "https://example.com/denied",
    );
    assert_eq!(url.unwrap().as_str(), "https://landing.example.com/blocked");

    // Invalid configured destination falls back to the default.
    let url = resolve_redirect_target(Some("::::"), "https://example.com/denied");
    assert_eq!(url.unwrap().as_str(), "https://example.com/denied");

    // Both invalid: the host skips the redirect.
    assert!(resolve_redirect_target(Some("::::"), "also-bad").is_none());
}
