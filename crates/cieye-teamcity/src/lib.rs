//! CI-Eye TeamCity Spy
//!
//! Observes a TeamCity server through its REST API and normalizes what it
//! finds into a stable domain model, whichever API generation the server
//! speaks.
//!
//! ## Key Components
//!
//! - `TeamCityCommunicator`: builds URLs from the configured endpoint,
//!   fetches through a `Contact`, and decodes the result
//! - `decode`: version-tolerant decoding of TeamCity 6.x and 7.x payloads
//! - `domain`: canonical builds, changes, projects and build types
//! - `obs`: structured tracing events for poll activity

mod communicator;
pub mod decode;
pub mod domain;
mod error;
pub mod obs;

pub use communicator::TeamCityCommunicator;
pub use domain::{
    Build, BuildDetail, BuildType, Change, ChangeDetail, ChangesHref, Project, ProjectDetail,
    ServerVersion,
};
pub use error::{CommunicatorError, DecodeError, DecodeResult, Result};
