//! Rule compiler: operator rule text into compiled matchers.
//!
//! One rule per line, four forms:
//!
//! - exact address: `218.192.104.7`
//! - last-octet range: `192.168.1.1-20`
//! - wildcard segment(s): `222.34.4.*`
//! - CIDR block: `218.192.104.0/24`
//!
//! Blank lines and lines starting with `#` are ignored. A line that
//! fits no form is dropped and the rest of the set still compiles;
//! a bad rule never takes the whole configuration down.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::matcher::{CompiledMatcher, OctetPattern};

/// Compile raw rule text into a matcher sequence.
///
/// Output order follows input order; order carries no matching
/// semantics and is kept for determinism only.
pub fn compile(text: &str) -> Vec<CompiledMatcher> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let compiled = compile_line(line);
            if compiled.is_none() {
                debug!("Skipping malformed rule line: {}", line);
            }
            compiled
        })
        .collect()
}

/// Classify and compile a single trimmed, non-comment rule line.
fn compile_line(line: &str) -> Option<CompiledMatcher> {
    if line.contains('/') {
        compile_cidr(line)
    } else if line.contains('*') {
        compile_wildcard(line)
    } else if last_segment_is_range(line) {
        compile_octet_range(line)
    } else {
        let addr: Ipv4Addr = line.parse().ok()?;
        Some(CompiledMatcher::exact(addr))
    }
}

/// CIDR form `network/prefix`. The interval is the network base through
/// its broadcast address, i.e. `[network & mask, (network & mask) | !mask]`.
fn compile_cidr(line: &str) -> Option<CompiledMatcher> {
    let (network, prefix) = line.split_once('/')?;
    let network: Ipv4Addr = network.parse().ok()?;
    let prefix = parse_decimal(prefix)?;
    // Ipv4Net::new rejects prefixes above 32; host bits are masked off
    // by network() rather than rejected, matching the legacy grammar.
    let net = Ipv4Net::new(network, prefix).ok()?;
    Some(CompiledMatcher::Interval {
        lo: u32::from(net.network()),
        hi: u32::from(net.broadcast()),
    })
}

/// Range form `a.b.c.low-high` over the final octet.
fn compile_octet_range(line: &str) -> Option<CompiledMatcher> {
    let (prefix, range) = line.rsplit_once('.')?;
    let (low, high) = range.split_once('-')?;
    let low = parse_decimal(low)?;
    let high = parse_decimal(high)?;
    if low > high {
        return None;
    }
    let base: Ipv4Addr = format!("{}.0", prefix).parse().ok()?;
    let base = u32::from(base);
    Some(CompiledMatcher::Interval {
        lo: base | u32::from(low),
        hi: base | u32::from(high),
    })
}

/// Wildcard form: `*` segments accept 0-255, the rest are fixed values.
fn compile_wildcard(line: &str) -> Option<CompiledMatcher> {
    let segments: Vec<&str> = line.split('.').collect();
    if segments.len() != 4 {
        return None;
    }
    let mut patterns = [OctetPattern::Any; 4];
    for (pattern, segment) in patterns.iter_mut().zip(segments) {
        *pattern = if segment == "*" {
            OctetPattern::Any
        } else {
            OctetPattern::Fixed(parse_decimal(segment)?)
        };
    }
    Some(CompiledMatcher::Octets(patterns))
}

/// Parse a bare decimal octet or prefix value. Stricter than
/// `u8::from_str`, which tolerates a leading `+`; the rule grammar is
/// digits only.
fn parse_decimal(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// True when the final dotted segment looks like `low-high`.
fn last_segment_is_range(line: &str) -> bool {
    line.rsplit_once('.')
        .map(|(_, last)| last.contains('-'))
        .unwrap_or(false)
}

/// Outcome of compiling one rule line, for operator-facing lint output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// The line compiled into a matcher.
    Accepted,
    /// The line fit no recognized rule form and will be ignored.
    Skipped,
}

/// Re-run classification per line and report which rules would be
/// dropped. Comments and blank lines are not reported.
pub fn lint(text: &str) -> Vec<(String, LintOutcome)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let outcome = if compile_line(line).is_some() {
                LintOutcome::Accepted
            } else {
                LintOutcome::Skipped
            };
            (line.to_string(), outcome)
        })
        .collect()
}
