//! CI-Eye Observation: Network Abstraction for CI Spies
//!
//! This crate provides the transport layer that CI spies observe servers
//! through. A spy never issues HTTP requests itself; it asks a
//! [`CommunicationNetwork`] to resolve a [`CodeBook`] into a reusable
//! [`Contact`], and fetches raw content through that contact.
//!
//! ## Key Components
//!
//! - `CodeBook`: endpoint descriptor (accepted media type, user agent, timeout)
//! - `CommunicationNetwork` / `Contact`: the injectable transport seam
//! - `HttpNetwork`: production network backed by `reqwest`
//! - `fakes`: in-memory network and contact mapping URLs to canned responses
//! - `telemetry`: tracing subscriber initialisation for binaries

mod codebook;
mod error;
pub mod fakes;
mod http;
mod network;
pub mod telemetry;

pub use codebook::CodeBook;
pub use error::TransportError;
pub use http::{HttpContact, HttpNetwork};
pub use network::{CommunicationNetwork, Contact};

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
