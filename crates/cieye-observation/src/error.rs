//! Error types for cieye-observation

use thiserror::Error;

/// Errors raised when a contact cannot retrieve content
#[derive(Error, Debug)]
pub enum TransportError {
    /// Nothing answered at the URL
    #[error("No response from {url}")]
    NoResponse { url: String },

    /// The server answered without any content
    #[error("Empty response from {url}")]
    Empty { url: String },

    /// The server answered with a non-success status
    #[error("Request to {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The request could not be sent or its body could not be read
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The underlying HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl TransportError {
    /// URL the failed fetch was aimed at, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            TransportError::NoResponse { url }
            | TransportError::Empty { url }
            | TransportError::Status { url, .. }
            | TransportError::Request { url, .. } => Some(url),
            TransportError::Client(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_reported_for_fetch_failures() {
        let err = TransportError::Status {
            url: "http://foo/app/rest/projects".to_string(),
            status: 503,
        };
        assert_eq!(err.url(), Some("http://foo/app/rest/projects"));
        assert_eq!(
            err.to_string(),
            "Request to http://foo/app/rest/projects failed with HTTP status 503"
        );
    }

    #[test]
    fn empty_response_names_the_url() {
        let err = TransportError::Empty {
            url: "http://foo/app/rest/changes/id:1".to_string(),
        };
        assert_eq!(err.url(), Some("http://foo/app/rest/changes/id:1"));
        assert_eq!(
            err.to_string(),
            "Empty response from http://foo/app/rest/changes/id:1"
        );
    }

    #[test]
    fn client_setup_failure_has_no_url() {
        let err = TransportError::Client("tls backend unavailable".to_string());
        assert!(err.url().is_none());
    }
}
