//! Intermediate wire shapes
//!
//! Each record covers the union of fields seen across TeamCity API
//! generations. Everything is optional here; required fields are enforced
//! when a record is reduced to its canonical type.
//!
//! Known skew between generations:
//! - 6.x prefixes attribute keys with `@` (`"@id"`, `"@count"`)
//! - 6.x renders a one-element list as a bare object
//! - scalars may arrive as strings (`"count": "2"`) or as JSON numbers
//! - legacy identifiers may carry a leading `@` in the value itself

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};

/// Legacy decoration marker on keys and identifiers.
pub const DECORATION_MARKER: char = '@';

/// Strip any leading decoration markers. Idempotent.
pub fn strip_marker(raw: &str) -> &str {
    raw.trim_start_matches(DECORATION_MARKER)
}

/// Remove decoration markers from every object key in the tree.
pub(crate) fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (strip_marker(&key).to_string(), normalize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// A string, number or boolean, whichever the server chose to send.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    pub(crate) fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
            Scalar::Flag(flag) => flag.to_string(),
        }
    }

    pub(crate) fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Text(text) => text.trim().parse().ok(),
            Scalar::Number(number) => number.as_u64(),
            Scalar::Flag(_) => None,
        }
    }

    pub(crate) fn as_bool(&self) -> bool {
        match self {
            Scalar::Flag(flag) => *flag,
            Scalar::Text(text) => text.eq_ignore_ascii_case("true"),
            Scalar::Number(_) => false,
        }
    }
}

/// A list that the legacy API collapses to a bare object when it has one
/// element.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Reduce an optional identifier to its canonical, undecorated form.
pub(crate) fn canonical_id(
    id: Option<Scalar>,
    resource: &'static str,
    index: usize,
) -> DecodeResult<String> {
    let raw = id
        .ok_or(DecodeError::MissingField {
            resource,
            field: "id",
        })?
        .into_text();
    let id = strip_marker(raw.trim());
    if id.is_empty() {
        return Err(DecodeError::EmptyId { resource, index });
    }
    Ok(id.to_string())
}

pub(crate) fn required<T>(
    value: Option<T>,
    resource: &'static str,
    field: &'static str,
) -> DecodeResult<T> {
    value.ok_or(DecodeError::MissingField { resource, field })
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerWire {
    pub version: Option<Scalar>,
    pub version_major: Option<Scalar>,
    pub version_minor: Option<Scalar>,
    pub build_number: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectWire {
    pub id: Option<Scalar>,
    pub name: Option<String>,
    pub href: Option<String>,
    pub web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectDetailWire {
    pub id: Option<Scalar>,
    pub name: Option<String>,
    pub build_types: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BuildTypeWire {
    pub id: Option<Scalar>,
    pub name: Option<String>,
    pub href: Option<String>,
    pub project_id: Option<Scalar>,
    pub web_url: Option<String>,
}

/// 6.x nests the build type; 7.x flattens it to `buildTypeId`.
#[derive(Debug, Deserialize)]
pub(crate) struct BuildTypeRefWire {
    pub id: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BuildWire {
    pub id: Option<Scalar>,
    pub number: Option<Scalar>,
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub href: Option<String>,
    pub web_url: Option<String>,
    pub build_type_id: Option<Scalar>,
    pub build_type: Option<BuildTypeRefWire>,
    pub running: Option<Scalar>,
    pub percentage_complete: Option<Scalar>,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
    pub changes: Option<ChangesHrefWire>,
}

impl BuildWire {
    pub(crate) fn build_type_id(&mut self) -> Option<String> {
        self.build_type_id
            .take()
            .or_else(|| self.build_type.take().and_then(|bt| bt.id))
            .map(|id| strip_marker(&id.into_text()).to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangesHrefWire {
    pub count: Option<Scalar>,
    pub href: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeWire {
    pub id: Option<Scalar>,
    pub version: Option<Scalar>,
    pub username: Option<String>,
    pub href: Option<String>,
    pub web_link: Option<String>,
    pub comment: Option<String>,
    pub date: Option<String>,
}
