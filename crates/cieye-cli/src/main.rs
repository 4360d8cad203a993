//! CI-Eye CLI
//!
//! The `cieye` command inspects a TeamCity server the same way the
//! dashboard poller does, printing the normalized model as JSON.
//!
//! ## Commands
//!
//! - `version`: server version
//! - `projects`: project listing
//! - `build-types`: build configurations of one project
//! - `running` / `last-completed`: builds of one configuration
//! - `changes`: changes of one build, optionally with full detail

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{info, Level};

use cieye_observation::{telemetry::init_tracing, CodeBook, HttpNetwork};
use cieye_teamcity::obs::PollSpan;
use cieye_teamcity::{Build, BuildDetail, BuildType, TeamCityCommunicator};

#[derive(Parser)]
#[command(name = "cieye")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect TeamCity servers through CI-Eye", long_about = None)]
struct Cli {
    /// TeamCity server endpoint, e.g. http://teamcity.example.com
    #[arg(long, env = "CIEYE_TEAMCITY_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CIEYE_TIMEOUT_SECS", default_value = "30", global = true)]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the server version
    Version,

    /// List projects
    Projects,

    /// List the build configurations of a project
    BuildTypes {
        /// Project id, e.g. project3
        #[arg(long)]
        project: String,
    },

    /// List running builds of a build configuration
    Running {
        /// Build configuration id, e.g. bt11
        #[arg(long)]
        build_type: String,
    },

    /// Show the last completed build of a build configuration
    LastCompleted {
        /// Build configuration id, e.g. bt11
        #[arg(long)]
        build_type: String,
    },

    /// List the changes of a build
    Changes {
        /// Build id, e.g. 4402
        #[arg(long)]
        build: String,

        /// Fetch comment, author and date for every change
        #[arg(long)]
        details: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let endpoint = cli
        .endpoint
        .as_deref()
        .context("No TeamCity endpoint given (use --endpoint or CIEYE_TEAMCITY_ENDPOINT)")?;
    let code_book = CodeBook::json().with_timeout(Duration::from_secs(cli.timeout_secs));
    let communicator =
        TeamCityCommunicator::with_code_book(&HttpNetwork::new(), endpoint, &code_book)
            .context("Failed to set up HTTP contact")?;
    let _span = PollSpan::enter(communicator.endpoint());

    match cli.command {
        Commands::Version => cmd_version(&communicator).await,
        Commands::Projects => cmd_projects(&communicator).await,
        Commands::BuildTypes { project } => cmd_build_types(&communicator, &project).await,
        Commands::Running { build_type } => cmd_running(&communicator, &build_type).await,
        Commands::LastCompleted { build_type } => {
            cmd_last_completed(&communicator, &build_type).await
        }
        Commands::Changes { build, details } => {
            cmd_changes(&communicator, &build, details).await
        }
    }
}

fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

/// Build configuration reference addressed by id alone
fn build_type_ref(id: &str) -> BuildType {
    BuildType {
        id: id.to_string(),
        name: id.to_string(),
        href: format!("/app/rest/buildTypes/id:{id}"),
        project_id: None,
        web_url: None,
    }
}

/// Build reference addressed by id alone
fn build_ref(id: &str) -> Build {
    Build {
        id: id.to_string(),
        number: None,
        status: None,
        href: format!("/app/rest/builds/id:{id}"),
        build_type_id: None,
        running: false,
        percentage_complete: None,
        web_url: None,
    }
}

async fn cmd_version(communicator: &TeamCityCommunicator) -> Result<()> {
    let version = communicator
        .version()
        .await
        .context("Failed to read server version")?;
    print_json(&version)
}

async fn cmd_projects(communicator: &TeamCityCommunicator) -> Result<()> {
    let projects = communicator
        .projects()
        .await
        .context("Failed to list projects")?;
    info!("Found {} projects", projects.len());
    print_json(&projects)
}

async fn cmd_build_types(communicator: &TeamCityCommunicator, project_id: &str) -> Result<()> {
    let projects = communicator
        .projects()
        .await
        .context("Failed to list projects")?;
    let project = projects
        .iter()
        .find(|p| p.id == project_id)
        .with_context(|| format!("No project with id '{project_id}'"))?;

    let detail = communicator
        .details_of_project(project)
        .await
        .with_context(|| format!("Failed to read project '{project_id}'"))?;
    print_json(&detail.build_types)
}

async fn cmd_running(communicator: &TeamCityCommunicator, build_type: &str) -> Result<()> {
    let builds = communicator
        .running_builds_for(&build_type_ref(build_type))
        .await
        .with_context(|| format!("Failed to list running builds of '{build_type}'"))?;
    print_json(&builds)
}

async fn cmd_last_completed(
    communicator: &TeamCityCommunicator,
    build_type: &str,
) -> Result<()> {
    let build = communicator
        .last_completed_build_for(&build_type_ref(build_type))
        .await
        .with_context(|| format!("Failed to find last completed build of '{build_type}'"))?;

    match build {
        Some(build) => {
            let detail = communicator
                .details_of(&build)
                .await
                .with_context(|| format!("Failed to read build {}", build.id))?;
            print_json(&detail)
        }
        None => {
            info!("No completed builds for '{build_type}'");
            print_json(&Option::<BuildDetail>::None)
        }
    }
}

async fn cmd_changes(
    communicator: &TeamCityCommunicator,
    build: &str,
    details: bool,
) -> Result<()> {
    let detail = communicator
        .details_of(&build_ref(build))
        .await
        .with_context(|| format!("Failed to read build {build}"))?;
    let changes = communicator
        .changes_of(&detail)
        .await
        .with_context(|| format!("Failed to read changes of build {build}"))?;

    if !details {
        return print_json(&changes);
    }

    let detailed = try_join_all(changes.iter().map(|c| communicator.details_of_change(c)))
        .await
        .with_context(|| format!("Failed to read change details of build {build}"))?;
    print_json(&detailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_changes_with_details() {
        let cli = Cli::try_parse_from([
            "cieye",
            "--endpoint",
            "http://teamcity.example.com",
            "changes",
            "--build",
            "4402",
            "--details",
        ])
        .unwrap();

        assert_eq!(cli.endpoint.as_deref(), Some("http://teamcity.example.com"));
        match cli.command {
            Commands::Changes { build, details } => {
                assert_eq!(build, "4402");
                assert!(details);
            }
            _ => panic!("expected changes command"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["cieye", "projects", "--verbose", "--json"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.json);
    }

    #[test]
    fn build_type_requires_id() {
        assert!(Cli::try_parse_from(["cieye", "running"]).is_err());
    }

    #[test]
    fn missing_build_renders_as_json_null() {
        let rendered = render_json(&Option::<BuildDetail>::None).unwrap();
        assert_eq!(rendered, "null");
        assert!(serde_json::from_str::<serde_json::Value>(&rendered)
            .unwrap()
            .is_null());
    }

    #[test]
    fn references_point_at_rest_resources() {
        assert_eq!(build_type_ref("bt11").href, "/app/rest/buildTypes/id:bt11");
        assert_eq!(build_ref("4402").href, "/app/rest/builds/id:4402");
    }
}
