//! Transport trait definitions
//!
//! - `CommunicationNetwork`: resolves a `CodeBook` into a `Contact`
//! - `Contact`: fetches raw content from a URL
//!
//! Both are `Send + Sync` so one contact can serve concurrent polls.
//! In-memory fakes are provided via the `fakes` module.

use std::sync::Arc;

use async_trait::async_trait;

use crate::codebook::CodeBook;
use crate::Result;

/// A resolved, reusable handle that fetches content from an endpoint.
///
/// Guarantees:
/// - `fetch(url)` returns the full response body, or a `TransportError`.
/// - Failures are never reported as empty content; a blank body is
///   `TransportError::Empty`.
#[async_trait]
pub trait Contact: Send + Sync {
    /// Retrieve the raw content served at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Resolves endpoint descriptors to contacts.
pub trait CommunicationNetwork: Send + Sync {
    /// Build a contact that speaks according to `code_book`.
    fn make_contact(&self, code_book: &CodeBook) -> Result<Arc<dyn Contact>>;
}
