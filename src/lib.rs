//! # ipgate - Address-Rule Access Gate with Geo Fallback
//!
//! Decides, for an incoming client address, whether a request should
//! be blocked, based on operator-configured address rules and an
//! approximate geolocation-based regional policy, with a short-lived
//! decision cache to avoid recomputation. Designed to sit in front of
//! a larger host application as an access-control gate.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         ipgate                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: check, lint, version                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Rules, TTL, geo policy, redirect target              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Rules (ipnet)                                              │
//! │    └── exact / range / wildcard / CIDR -> CompiledMatcher   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Geo (reqwest + rustls, RegionLookup trait)                 │
//! │    └── 2s-bounded lookup, locale fallback heuristic         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Cache                                                      │
//! │    └── hashed-key TTL map, lazy expiry                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Engine                                                     │
//! │    └── cache -> rules -> geo, verdict cached for one hour   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use ipgate::config::GateConfig;
//! use ipgate::engine::AccessGate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GateConfig::load("/etc/ipgate/config.yaml")?;
//!     let gate = AccessGate::from_config(&config)?;
//!
//!     if gate.should_block("203.0.113.7", "en-US,en;q=0.9").await {
//!         // The host clears session state and redirects the client;
//!         // resolve_redirect_target picks a validated destination.
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cache`] - Short-lived per-address decision cache
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`engine`] - Access decision orchestration
//! - [`geo`] - Geolocation lookup and regional block policy
//! - [`matcher`] - Compiled address matchers
//! - [`redirect`] - Redirect-target validation for the host
//! - [`rules`] - Rule text compiler

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod geo;
pub mod matcher;
pub mod redirect;
pub mod rules;

pub use cli::{Cli, Commands};
pub use config::GateConfig;
pub use engine::AccessGate;
