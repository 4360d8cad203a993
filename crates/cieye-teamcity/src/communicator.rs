//! TeamCity REST communicator
//!
//! URLs are formed by plain concatenation of the configured endpoint and a
//! path or server-supplied href. Nothing is joined, normalized or encoded,
//! so hrefs must already start with `/`.

use std::sync::Arc;

use cieye_observation::{CodeBook, CommunicationNetwork, Contact, TransportError};

use crate::decode;
use crate::domain::{
    Build, BuildDetail, BuildType, Change, ChangeDetail, Project, ProjectDetail, ServerVersion,
};
use crate::error::{DecodeError, DecodeResult, Result};
use crate::obs;

const SERVER_PATH: &str = "/app/rest/server";
const PROJECTS_PATH: &str = "/app/rest/projects";
const BUILDS_PATH: &str = "/app/rest/builds/?locator=";

/// Observes one TeamCity server.
///
/// Holds the endpoint and a single contact resolved at construction; both
/// are immutable, so one communicator can serve concurrent polls.
#[derive(Clone)]
pub struct TeamCityCommunicator {
    endpoint: String,
    contact: Arc<dyn Contact>,
}

impl std::fmt::Debug for TeamCityCommunicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamCityCommunicator")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl TeamCityCommunicator {
    /// Resolve a JSON contact on `network` for the server at `endpoint`.
    pub fn new(
        network: &dyn CommunicationNetwork,
        endpoint: &str,
    ) -> std::result::Result<Self, TransportError> {
        Self::with_code_book(network, endpoint, &CodeBook::json())
    }

    pub fn with_code_book(
        network: &dyn CommunicationNetwork,
        endpoint: &str,
        code_book: &CodeBook,
    ) -> std::result::Result<Self, TransportError> {
        Ok(TeamCityCommunicator {
            endpoint: endpoint.to_string(),
            contact: network.make_contact(code_book)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, href: &str) -> String {
        format!("{}{}", self.endpoint, href)
    }

    async fn call<T>(&self, url: &str, decoder: fn(&str) -> DecodeResult<T>) -> Result<T> {
        obs::emit_fetch(url);
        let content = self
            .contact
            .fetch(url)
            .await
            .and_then(|content| {
                if content.trim().is_empty() {
                    Err(TransportError::Empty {
                        url: url.to_string(),
                    })
                } else {
                    Ok(content)
                }
            })
            .map_err(|e| {
                obs::emit_fetch_failed(url, &e);
                e
            })?;
        decoder(&content).map_err(|e| {
            obs::emit_decode_failed(url, &e);
            e.into()
        })
    }

    /// Server version as reported by `/app/rest/server`.
    pub async fn version(&self) -> Result<ServerVersion> {
        self.call(&self.url_for(SERVER_PATH), decode::decode_server_version)
            .await
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.call(&self.url_for(PROJECTS_PATH), decode::decode_projects)
            .await
    }

    /// Project with its build configurations.
    pub async fn details_of_project(&self, project: &Project) -> Result<ProjectDetail> {
        self.call(&self.url_for(&project.href), decode::decode_project_detail)
            .await
    }

    pub async fn running_builds_for(&self, build_type: &BuildType) -> Result<Vec<Build>> {
        let locator = format!("running:true,buildType:id:{}", build_type.id);
        self.call(
            &self.url_for(&format!("{BUILDS_PATH}{locator}")),
            decode::decode_builds,
        )
        .await
    }

    /// Most recent finished build, if the configuration has ever finished one.
    pub async fn last_completed_build_for(&self, build_type: &BuildType) -> Result<Option<Build>> {
        let locator = format!("running:false,count:1,buildType:id:{}", build_type.id);
        let builds = self
            .call(
                &self.url_for(&format!("{BUILDS_PATH}{locator}")),
                decode::decode_builds,
            )
            .await?;
        Ok(builds.into_iter().next())
    }

    pub async fn details_of(&self, build: &Build) -> Result<BuildDetail> {
        self.call(&self.url_for(&build.href), decode::decode_build_detail)
            .await
    }

    /// Changes of a build, in the order the server lists them.
    ///
    /// Fetches `endpoint + build_detail.changes.href`. Transport and decode
    /// failures propagate; an empty list means the build has no changes.
    pub async fn changes_of(&self, build_detail: &BuildDetail) -> Result<Vec<Change>> {
        let url = self.url_for(&build_detail.changes.href);
        let changes = self.call(&url, decode::decode_changes).await?;
        obs::emit_changes_decoded(&url, changes.len());
        Ok(changes)
    }

    pub async fn details_of_change(&self, change: &Change) -> Result<ChangeDetail> {
        let href = change.href.as_deref().ok_or(DecodeError::MissingField {
            resource: "change",
            field: "href",
        })?;
        self.call(&self.url_for(href), decode::decode_change_detail)
            .await
    }
}
