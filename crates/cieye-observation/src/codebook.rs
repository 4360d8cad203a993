//! Endpoint descriptors
//!
//! A `CodeBook` tells a network how to talk to an endpoint: which media
//! type to ask for, how to identify itself, and how long to wait. It is
//! resolved once into a `Contact` that is reused for every request.

use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const JSON: &str = "application/json";

/// Endpoint descriptor resolved by a `CommunicationNetwork`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBook {
    /// Media type sent in the `Accept` header
    pub accept: String,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Per-request timeout enforced by the transport
    pub timeout: Duration,
}

impl Default for CodeBook {
    fn default() -> Self {
        let timeout = std::env::var("CIEYE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        CodeBook {
            accept: JSON.to_string(),
            user_agent: std::env::var("CIEYE_USER_AGENT")
                .unwrap_or_else(|_| format!("cieye/{}", env!("CARGO_PKG_VERSION"))),
            timeout: Duration::from_secs(timeout),
        }
    }
}

impl CodeBook {
    /// JSON code book configured from environment variables
    pub fn json() -> Self {
        Self::default()
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }
}
