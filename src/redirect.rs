//! Redirect-target resolution for the host collaborator.
//!
//! The gate itself only returns a verdict; on `block = true` the host
//! clears session state and redirects the client. This helper picks
//! the destination: the operator-configured URL when valid, otherwise
//! the host's default, otherwise nothing (the host skips the redirect
//! and continues; a bad destination is never a hard error).

use tracing::warn;
use url::Url;

use crate::config::validate_http_url;

/// Resolve the redirect destination for a blocked request.
pub fn resolve_redirect_target(configured: Option<&str>, fallback: &str) -> Option<Url> {
    if let Some(raw) = configured {
        match validate_http_url(raw) {
            Ok(url) => return Some(url),
            Err(e) => warn!("Configured redirect URL '{}' rejected: {:#}", raw, e),
        }
    }
    match validate_http_url(fallback) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(
                "Default redirect URL '{}' rejected, skipping redirect: {:#}",
                fallback, e
            );
            None
        }
    }
}
