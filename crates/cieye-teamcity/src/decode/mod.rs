//! Version-tolerant decoding of TeamCity REST payloads
//!
//! All decoders share one pipeline:
//!
//! 1. parse the raw text into a `serde_json::Value`
//! 2. strip legacy `@` markers from every key
//! 3. deserialize into a wire record that accepts every known layout
//! 4. reduce the record to its canonical domain type, stripping id markers
//!
//! There is no API version detection. Every step is a no-op on payloads
//! that do not need it, so TeamCity 6.x and 7.x content decodes to the
//! same result.

mod wire;

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    Build, BuildDetail, BuildType, Change, ChangeDetail, ChangesHref, Project, ProjectDetail,
    ServerVersion,
};
use crate::error::{DecodeError, DecodeResult};
use crate::obs;

pub use wire::{strip_marker, DECORATION_MARKER};
use wire::{
    canonical_id, normalize_keys, required, BuildTypeWire, BuildWire, ChangeWire, OneOrMany,
    ProjectDetailWire, ProjectWire, Scalar, ServerWire,
};

/// TeamCity renders timestamps as `yyyyMMdd'T'HHmmssZ`.
const TEAMCITY_DATE_FORMAT: &str = "%Y%m%dT%H%M%S%z";

fn parse(raw: &str) -> DecodeResult<Value> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(normalize_keys(value))
}

fn record<W: DeserializeOwned>(raw: &str) -> DecodeResult<W> {
    Ok(serde_json::from_value(parse(raw)?)?)
}

/// Pull the `key` list out of a listing container.
///
/// The result is sized to the elements actually present. `count` only
/// decides whether a missing list means "empty" (count 0) or "malformed".
fn items_of<W: DeserializeOwned>(
    mut container: Value,
    resource: &'static str,
    key: &'static str,
) -> DecodeResult<Vec<W>> {
    let declared = container
        .get("count")
        .cloned()
        .and_then(|count| serde_json::from_value::<Scalar>(count).ok())
        .and_then(|count| count.as_u64());

    let list = container.get_mut(key).map(Value::take);
    let items = match list {
        Some(Value::Null) | None => {
            if declared == Some(0) {
                Vec::new()
            } else {
                return Err(DecodeError::MissingField {
                    resource,
                    field: key,
                });
            }
        }
        Some(list) => serde_json::from_value::<OneOrMany<W>>(list)?.into_vec(),
    };

    if let Some(declared) = declared {
        if declared != items.len() as u64 {
            obs::emit_count_mismatch(resource, declared, items.len());
        }
    }
    Ok(items)
}

fn is_bare_container(container: &Value, key: &str) -> bool {
    container.get("count").is_none() && container.get(key).map_or(true, Value::is_null)
}

fn date(raw: Option<String>) -> DecodeResult<Option<DateTime<FixedOffset>>> {
    raw.map(|value| {
        DateTime::parse_from_str(value.trim(), TEAMCITY_DATE_FORMAT)
            .map_err(|_| DecodeError::InvalidDate { value })
    })
    .transpose()
}

fn text(value: Option<Scalar>) -> Option<String> {
    value.map(Scalar::into_text)
}

fn percentage(value: Option<Scalar>) -> Option<u32> {
    value
        .as_ref()
        .and_then(Scalar::as_u64)
        .and_then(|p| u32::try_from(p).ok())
}

/// Decode the changes listing referenced by a build.
pub fn decode_changes(raw: &str) -> DecodeResult<Vec<Change>> {
    items_of::<ChangeWire>(parse(raw)?, "change", "change")?
        .into_iter()
        .enumerate()
        .map(|(index, wire)| -> DecodeResult<Change> {
            Ok(Change {
                id: canonical_id(wire.id, "change", index)?,
                version: text(wire.version),
                username: wire.username,
                href: wire.href,
                web_link: wire.web_link,
            })
        })
        .collect()
}

/// Decode a single change resource.
pub fn decode_change_detail(raw: &str) -> DecodeResult<ChangeDetail> {
    let wire: ChangeWire = record(raw)?;
    Ok(ChangeDetail {
        id: canonical_id(wire.id, "change", 0)?,
        version: text(wire.version),
        username: wire.username,
        comment: wire.comment,
        date: date(wire.date)?,
    })
}

/// Decode `/app/rest/server`.
pub fn decode_server_version(raw: &str) -> DecodeResult<ServerVersion> {
    let wire: ServerWire = record(raw)?;
    let version = required(text(wire.version), "server", "version")?;
    let version = version.trim().to_string();
    if version.is_empty() {
        return Err(DecodeError::MissingField {
            resource: "server",
            field: "version",
        });
    }

    let component = |value: Option<Scalar>| {
        value
            .as_ref()
            .and_then(Scalar::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };
    Ok(ServerVersion {
        version,
        major: component(wire.version_major),
        minor: component(wire.version_minor),
        build_number: text(wire.build_number),
    })
}

/// Decode the `/app/rest/projects` listing.
pub fn decode_projects(raw: &str) -> DecodeResult<Vec<Project>> {
    items_of::<ProjectWire>(parse(raw)?, "project", "project")?
        .into_iter()
        .enumerate()
        .map(|(index, wire)| -> DecodeResult<Project> {
            Ok(Project {
                id: canonical_id(wire.id, "project", index)?,
                name: required(wire.name, "project", "name")?,
                href: required(wire.href, "project", "href")?,
                web_url: wire.web_url,
            })
        })
        .collect()
}

fn build_type(index: usize, wire: BuildTypeWire) -> DecodeResult<BuildType> {
    Ok(BuildType {
        id: canonical_id(wire.id, "buildType", index)?,
        name: required(wire.name, "buildType", "name")?,
        href: required(wire.href, "buildType", "href")?,
        project_id: text(wire.project_id).map(|id| strip_marker(&id).to_string()),
        web_url: wire.web_url,
    })
}

/// Decode a project resource with its build configurations.
pub fn decode_project_detail(raw: &str) -> DecodeResult<ProjectDetail> {
    let wire: ProjectDetailWire = record(raw)?;
    let build_types = match wire.build_types {
        // An uncounted container without a list has no build configurations.
        Some(container) if is_bare_container(&container, "buildType") => Vec::new(),
        Some(container) => items_of::<BuildTypeWire>(container, "buildType", "buildType")?
            .into_iter()
            .enumerate()
            .map(|(index, wire)| build_type(index, wire))
            .collect::<DecodeResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(ProjectDetail {
        id: canonical_id(wire.id, "project", 0)?,
        name: required(wire.name, "project", "name")?,
        build_types,
    })
}

/// Decode a `/app/rest/builds` listing.
pub fn decode_builds(raw: &str) -> DecodeResult<Vec<Build>> {
    items_of::<BuildWire>(parse(raw)?, "build", "build")?
        .into_iter()
        .enumerate()
        .map(|(index, mut wire)| -> DecodeResult<Build> {
            let build_type_id = wire.build_type_id();
            Ok(Build {
                id: canonical_id(wire.id, "build", index)?,
                number: text(wire.number),
                status: wire.status,
                href: required(wire.href, "build", "href")?,
                build_type_id,
                running: wire.running.as_ref().is_some_and(Scalar::as_bool),
                percentage_complete: percentage(wire.percentage_complete),
                web_url: wire.web_url,
            })
        })
        .collect()
}

/// Decode a single build resource.
pub fn decode_build_detail(raw: &str) -> DecodeResult<BuildDetail> {
    let mut wire: BuildWire = record(raw)?;
    let build_type_id = wire.build_type_id();
    let changes = required(wire.changes, "build", "changes")?;

    Ok(BuildDetail {
        id: text(wire.id).map(|id| strip_marker(&id).to_string()),
        number: text(wire.number),
        status: wire.status,
        status_text: wire.status_text,
        href: wire.href,
        web_url: wire.web_url,
        build_type_id,
        running: wire.running.as_ref().is_some_and(Scalar::as_bool),
        percentage_complete: percentage(wire.percentage_complete),
        start_date: date(wire.start_date)?,
        finish_date: date(wire.finish_date)?,
        changes: ChangesHref {
            count: changes.count.as_ref().and_then(Scalar::as_u64).unwrap_or(0),
            href: required(changes.href, "changes", "href")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn legacy_marked_ids_are_stripped() {
        let raw = r#"{"count":1,"change":[{"id":"@48834"}]}"#;
        let changes = decode_changes(raw).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, "48834");
    }

    #[test]
    fn current_ids_pass_through() {
        let raw = r#"{"count":2,"change":[{"id":"62855"},{"id":"62854"}]}"#;
        let ids: Vec<_> = decode_changes(raw)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["62855", "62854"]);
    }

    #[test]
    fn numeric_ids_become_text() {
        let raw = r#"{"count":1,"change":[{"id":62889}]}"#;
        assert_eq!(decode_changes(raw).unwrap()[0].id, "62889");
    }

    #[test]
    fn result_follows_elements_not_count() {
        let understated = r#"{"count":1,"change":[{"id":"3"},{"id":"2"},{"id":"1"}]}"#;
        let overstated = r#"{"count":9,"change":[{"id":"3"}]}"#;
        assert_eq!(decode_changes(understated).unwrap().len(), 3);
        assert_eq!(decode_changes(overstated).unwrap().len(), 1);
    }

    #[test]
    #[traced_test]
    fn count_mismatch_is_logged_while_decoding() {
        let changes = decode_changes(r#"{"count":5,"change":[{"id":"1"}]}"#).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(logs_contain("teamcity.count_mismatch"));
    }

    #[test]
    #[traced_test]
    fn matching_count_logs_nothing() {
        decode_changes(r#"{"count":2,"change":[{"id":"1"},{"id":"2"}]}"#).unwrap();
        assert!(!logs_contain("teamcity.count_mismatch"));
    }

    #[test]
    fn empty_build_types_container_is_empty() {
        let detail = decode_project_detail(r#"{"id":"p","name":"n","buildTypes":{}}"#).unwrap();
        assert_eq!(detail.id, "p");
        assert!(detail.build_types.is_empty());

        let detail =
            decode_project_detail(r#"{"id":"p","name":"n","buildTypes":{"count":0}}"#).unwrap();
        assert!(detail.build_types.is_empty());

        let err =
            decode_project_detail(r#"{"id":"p","name":"n","buildTypes":{"count":2}}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                field: "buildType",
                ..
            }
        ));
    }

    #[test]
    fn zero_changes_is_empty() {
        assert!(decode_changes(r#"{"count":0,"change":[]}"#).unwrap().is_empty());
        assert!(decode_changes(r#"{"count":0}"#).unwrap().is_empty());
        assert!(decode_changes(r#"{"change":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_change_list_is_an_error() {
        let err = decode_changes(r#"{"count":2}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                field: "change",
                ..
            }
        ));
        assert!(decode_changes("{}").is_err());
    }

    #[test]
    fn missing_id_is_an_error() {
        let raw = r#"{"count":2,"change":[{"id":"1"},{"version":"abc"}]}"#;
        let err = decode_changes(raw).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "id", .. }));
    }

    #[test]
    fn empty_id_reports_position() {
        let raw = r#"{"change":[{"id":"1"},{"id":""}]}"#;
        let err = decode_changes(raw).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyId { index: 1, .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            decode_changes("<html>").unwrap_err(),
            DecodeError::Json(_)
        ));
    }

    #[test]
    fn non_object_root_is_an_error() {
        assert!(decode_changes("[]").is_err());
        assert!(decode_changes(r#""change""#).is_err());
    }

    #[test]
    fn change_detail_parses_teamcity_dates() {
        let raw = r#"{"id":"62889","version":"a1b2","username":"jdoe",
            "comment":"Fix flaky test","date":"20120203T135004+0100"}"#;
        let detail = decode_change_detail(raw).unwrap();
        assert_eq!(detail.id, "62889");
        assert_eq!(detail.username.as_deref(), Some("jdoe"));
        let date = detail.date.unwrap();
        assert_eq!(date.to_rfc3339(), "2012-02-03T13:50:04+01:00");
    }

    #[test]
    fn bad_dates_are_rejected() {
        let raw = r#"{"id":"1","date":"yesterday"}"#;
        assert!(matches!(
            decode_change_detail(raw).unwrap_err(),
            DecodeError::InvalidDate { .. }
        ));
    }

    #[test]
    fn server_version_requires_version() {
        let raw = r#"{"versionMajor":7}"#;
        assert!(decode_server_version(raw).is_err());
        let raw = r#"{"@version":" 6.5.5 (build 18087) ","@versionMajor":"6","@versionMinor":"5"}"#;
        let version = decode_server_version(raw).unwrap();
        assert_eq!(version.version, "6.5.5 (build 18087)");
        assert_eq!(version.major, Some(6));
        assert_eq!(version.minor, Some(5));
    }

    #[test]
    fn build_detail_requires_changes_reference() {
        let raw = r#"{"id":1,"href":"/app/rest/builds/id:1"}"#;
        assert!(matches!(
            decode_build_detail(raw).unwrap_err(),
            DecodeError::MissingField {
                field: "changes",
                ..
            }
        ));
    }

    #[test]
    fn build_type_id_from_either_layout() {
        let nested = r#"{"build":{"@id":"7","@href":"/b/7","buildType":{"@id":"bt2"}}}"#;
        let flat = r#"{"build":[{"id":7,"href":"/b/7","buildTypeId":"bt2"}]}"#;
        assert_eq!(
            decode_builds(nested).unwrap()[0].build_type_id.as_deref(),
            Some("bt2")
        );
        assert_eq!(
            decode_builds(flat).unwrap()[0].build_type_id.as_deref(),
            Some("bt2")
        );
    }
}
