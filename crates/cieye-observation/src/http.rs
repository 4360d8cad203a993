//! HTTP transport backed by `reqwest`
//!
//! Each contact owns one pooled `reqwest::Client`, so resolving a contact
//! once and reusing it keeps connections alive across polls.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::codebook::CodeBook;
use crate::error::TransportError;
use crate::network::{CommunicationNetwork, Contact};
use crate::Result;

/// Network that resolves code books into HTTP contacts
#[derive(Debug, Clone, Default)]
pub struct HttpNetwork;

impl HttpNetwork {
    pub fn new() -> Self {
        Self
    }
}

impl CommunicationNetwork for HttpNetwork {
    fn make_contact(&self, code_book: &CodeBook) -> Result<Arc<dyn Contact>> {
        let contact: Arc<dyn Contact> = Arc::new(HttpContact::new(code_book.clone())?);
        Ok(contact)
    }
}

/// Contact issuing plain GET requests
#[derive(Debug, Clone)]
pub struct HttpContact {
    client: reqwest::Client,
    code_book: CodeBook,
}

impl HttpContact {
    /// Create a contact for the given code book
    pub fn new(code_book: CodeBook) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(code_book.user_agent.clone())
            .timeout(code_book.timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(HttpContact { client, code_book })
    }

    /// The code book this contact was resolved from
    pub fn code_book(&self) -> &CodeBook {
        &self.code_book
    }
}

#[async_trait]
impl Contact for HttpContact {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(event = "transport.fetch", url = %url, accept = %self.code_book.accept);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, self.code_book.accept.as_str())
            .send()
            .await
            .map_err(|e| request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(event = "transport.fetch_failed", url = %url, status = status.as_u16());
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| request_failed(url, e))?;
        if body.trim().is_empty() {
            warn!(event = "transport.fetch_failed", url = %url, reason = "empty body");
            return Err(TransportError::Empty {
                url: url.to_string(),
            });
        }
        Ok(body)
    }
}

fn request_failed(url: &str, err: reqwest::Error) -> TransportError {
    warn!(event = "transport.fetch_failed", url = %url, error = %err);
    if err.is_connect() {
        TransportError::NoResponse {
            url: url.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
