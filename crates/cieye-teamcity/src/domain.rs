//! Canonical TeamCity domain model
//!
//! Every supported API generation decodes into these types. They are plain
//! snapshots: built per poll, never mutated, never tied to a connection.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Version information reported by `/app/rest/server`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub version: String,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub build_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Relative to the server endpoint
    pub href: String,
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub id: String,
    pub name: String,
    pub build_types: Vec<BuildType>,
}

/// A build configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildType {
    pub id: String,
    pub name: String,
    pub href: String,
    pub project_id: Option<String>,
    pub web_url: Option<String>,
}

/// Summary entry from a build listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    pub number: Option<String>,
    pub status: Option<String>,
    pub href: String,
    pub build_type_id: Option<String>,
    pub running: bool,
    pub percentage_complete: Option<u32>,
    pub web_url: Option<String>,
}

/// Forward reference to a build's changes.
///
/// `count` is a sizing hint only; `href` is the authoritative locator,
/// relative to the server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesHref {
    pub count: u64,
    pub href: String,
}

/// Full description of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDetail {
    pub id: Option<String>,
    pub number: Option<String>,
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub href: Option<String>,
    pub web_url: Option<String>,
    pub build_type_id: Option<String>,
    pub running: bool,
    pub percentage_complete: Option<u32>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub finish_date: Option<DateTime<FixedOffset>>,
    pub changes: ChangesHref,
}

impl BuildDetail {
    /// Detail carrying only a changes reference
    pub fn with_changes(count: u64, href: &str) -> Self {
        BuildDetail {
            id: None,
            number: None,
            status: None,
            status_text: None,
            href: None,
            web_url: None,
            build_type_id: None,
            running: false,
            percentage_complete: None,
            start_date: None,
            finish_date: None,
            changes: ChangesHref {
                count,
                href: href.to_string(),
            },
        }
    }
}

/// A single source-control change associated with a build.
///
/// `id` is never empty and carries no legacy decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub id: String,
    pub version: Option<String>,
    pub username: Option<String>,
    pub href: Option<String>,
    pub web_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetail {
    pub id: String,
    pub version: Option<String>,
    pub username: Option<String>,
    pub comment: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
}
