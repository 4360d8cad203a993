//! Structured observability hooks for TeamCity polling.
//!
//! This module provides:
//! - Endpoint-scoped tracing spans via the `PollSpan` RAII guard
//! - Emission functions for fetches, decode outcomes and count skew
//!
//! Events carry a dotted `event` field so they can be filtered in JSON
//! log pipelines.

use tracing::{debug, info, warn};

/// RAII guard that enters a span tagged with the polled endpoint.
///
/// # Example
///
/// ```ignore
/// let _span = PollSpan::enter("http://teamcity.example.com");
/// // tracing calls are now associated with endpoint = "http://teamcity.example.com"
/// ```
pub struct PollSpan {
    _span: tracing::span::EnteredSpan,
}

impl PollSpan {
    pub fn enter(endpoint: &str) -> Self {
        let span = tracing::info_span!("cieye.poll", endpoint = %endpoint);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a fetch is about to be issued.
pub fn emit_fetch(url: &str) {
    debug!(event = "teamcity.fetch", url = %url);
}

/// Emit event: the contact failed to deliver content (warning level).
pub fn emit_fetch_failed(url: &str, error: &dyn std::fmt::Display) {
    warn!(event = "teamcity.fetch_failed", url = %url, error = %error);
}

/// Emit event: content arrived but could not be decoded (warning level).
pub fn emit_decode_failed(url: &str, error: &dyn std::fmt::Display) {
    warn!(event = "teamcity.decode_failed", url = %url, error = %error);
}

/// Emit event: a build's changes were decoded.
pub fn emit_changes_decoded(url: &str, changes: usize) {
    info!(event = "teamcity.changes_decoded", url = %url, changes = changes);
}

/// Emit event: a listing declared a different `count` than it contained.
pub fn emit_count_mismatch(resource: &str, declared: u64, actual: usize) {
    warn!(
        event = "teamcity.count_mismatch",
        resource = %resource,
        declared = declared,
        actual = actual,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn count_mismatch_is_logged() {
        emit_count_mismatch("change", 3, 1);
        assert!(logs_contain("teamcity.count_mismatch"));
        assert!(logs_contain("declared=3"));
    }

    #[traced_test]
    #[test]
    fn changes_decoded_carries_url() {
        emit_changes_decoded("http://foo/app/rest/changes/id:1", 2);
        assert!(logs_contain("http://foo/app/rest/changes/id:1"));
    }

    #[traced_test]
    #[test]
    fn poll_span_enter_and_drop() {
        let span = PollSpan::enter("http://foo");
        emit_fetch("http://foo/app/rest/server");
        drop(span);
    }
}
