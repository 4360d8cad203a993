//! In-memory fakes for the transport traits (testing only)
//!
//! Provides `StubContact` and `StubNetwork` that satisfy the trait
//! contracts without touching the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::codebook::CodeBook;
use crate::error::TransportError;
use crate::network::{CommunicationNetwork, Contact};
use crate::Result;

// ---------------------------------------------------------------------------
// StubContact
// ---------------------------------------------------------------------------

/// Contact answering from a `HashMap<url, content>`.
///
/// Unknown URLs fail with `TransportError::NoResponse`. Every requested URL
/// is recorded in order.
#[derive(Debug, Default)]
pub struct StubContact {
    responses: Mutex<HashMap<String, String>>,
    requested: Mutex<Vec<String>>,
}

impl StubContact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for requests to exactly `url`.
    pub fn responding_with(&self, url: &str, content: &str) -> &Self {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), content.to_string());
        self
    }

    /// URLs fetched so far, in request order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Contact for StubContact {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        let responses = self.responses.lock().unwrap();
        responses
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::NoResponse {
                url: url.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// StubNetwork
// ---------------------------------------------------------------------------

/// Network that hands out the same `StubContact` for every code book.
#[derive(Debug)]
pub struct StubNetwork {
    contact: Arc<StubContact>,
    code_books: Mutex<Vec<CodeBook>>,
}

impl StubNetwork {
    pub fn new(contact: Arc<StubContact>) -> Self {
        StubNetwork {
            contact,
            code_books: Mutex::new(Vec::new()),
        }
    }

    /// Code books resolved so far; one entry per `make_contact` call.
    pub fn code_books(&self) -> Vec<CodeBook> {
        self.code_books.lock().unwrap().clone()
    }

    /// Number of contacts handed out.
    pub fn contacts_made(&self) -> usize {
        self.code_books.lock().unwrap().len()
    }
}

impl CommunicationNetwork for StubNetwork {
    fn make_contact(&self, code_book: &CodeBook) -> Result<Arc<dyn Contact>> {
        self.code_books.lock().unwrap().push(code_book.clone());
        let contact: Arc<dyn Contact> = self.contact.clone();
        Ok(contact)
    }
}
