//! Compiled address matchers and per-address evaluation.

use std::net::Ipv4Addr;

/// Constraint on a single octet of a dotted-quad address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OctetPattern {
    /// Any value 0-255.
    Any,
    /// Exactly this value.
    Fixed(u8),
}

impl OctetPattern {
    fn accepts(&self, value: u8) -> bool {
        match self {
            OctetPattern::Any => true,
            OctetPattern::Fixed(v) => *v == value,
        }
    }
}

/// A compiled, immutable predicate over the 32-bit IPv4 address space.
///
/// Exact, last-octet-range, and CIDR rules all reduce to an inclusive
/// integer interval. Wildcard rules keep a per-octet constraint set so
/// that a wildcard in any segment position stays a single matcher
/// instead of a union of intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledMatcher {
    /// Inclusive interval `[lo, hi]` over the address as a big-endian u32.
    Interval { lo: u32, hi: u32 },
    /// One constraint per octet, most significant first.
    Octets([OctetPattern; 4]),
}

impl CompiledMatcher {
    /// Build a degenerate interval matching exactly one address.
    pub fn exact(addr: Ipv4Addr) -> Self {
        let v = u32::from(addr);
        CompiledMatcher::Interval { lo: v, hi: v }
    }

    /// True iff `addr` falls inside this matcher's accepted set.
    pub fn matches(&self, addr: Ipv4Addr) -> bool {
        match self {
            CompiledMatcher::Interval { lo, hi } => {
                let v = u32::from(addr);
                *lo <= v && v <= *hi
            }
            CompiledMatcher::Octets(patterns) => addr
                .octets()
                .iter()
                .zip(patterns.iter())
                .all(|(octet, pattern)| pattern.accepts(*octet)),
        }
    }
}

/// Evaluate one client address against a compiled matcher sequence.
///
/// Returns true iff the address falls inside at least one matcher's
/// accepted set. Short-circuits on the first hit; matchers are pure so
/// this is equivalent to testing all of them. An address that does not
/// parse as a strict dotted-quad matches nothing.
pub fn matches_any(addr: &str, matchers: &[CompiledMatcher]) -> bool {
    let Ok(addr) = addr.trim().parse::<Ipv4Addr>() else {
        return false;
    };
    matchers.iter().any(|m| m.matches(addr))
}
