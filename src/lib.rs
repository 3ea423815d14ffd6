//! Cloud Foundry V3 API client library.
//!
//! A Rust library for interacting with the Cloud Foundry V3 REST API using
//! a trait-based architecture where each operation (Get, List, Create,
//! Update, Delete) is defined as a trait that resource types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use cfapi::{App, CfClient, Get, List, Organization};
//!
//! #[tokio::main]
//! async fn main() -> cfapi::Result<()> {
//!     // Create client from environment variables
//!     let client = CfClient::from_env().await?;
//!
//!     // List all organizations
//!     let orgs = Organization::list_all(&client, &Default::default()).await?;
//!     println!("Found {} organizations", orgs.len());
//!
//!     // Get an app by GUID
//!     let app = App::get(&client, "585bc3c1-3743-497d-88b0-403ad6b56d16".to_string()).await?;
//!     println!("App: {} ({})", app.name, app.state);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Asynchronous operations
//!
//! Deletes, managed service provisioning, and deployments complete
//! asynchronously on the platform side. The [`poll_until_terminal`]
//! primitive waits for such an operation to reach a terminal state under a
//! [`PollPolicy`]; [`Job::poll_complete`] and
//! [`ServiceInstance::poll_last_operation`] wrap it for the two common
//! cases:
//!
//! ```no_run
//! use std::time::Duration;
//! use cfapi::{CfClient, Delete, Job, PollPolicy, Space};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(client: CfClient, space_guid: String) -> cfapi::Result<()> {
//! if let Some(job_guid) = Space::delete(&client, space_guid).await? {
//!     let policy = PollPolicy::with_deadline(Duration::from_secs(2), Duration::from_secs(120));
//!     Job::poll_complete(&client, &job_guid, &policy, &CancellationToken::new()).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The library is organized around five core traits:
//!
//! - [`Get`] - Fetch a single resource by GUID
//! - [`List`] - Fetch paginated collections of resources
//! - [`Create`] - Provision a new resource
//! - [`Update`] - Modify an existing resource
//! - [`Delete`] - Remove a resource (async deletes return a job GUID)
//!
//! Each resource type (like [`App`] or [`ServiceInstance`]) implements the
//! traits that are supported by its API endpoints.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `CF_API_URL` (required) - Base URL of the V3 API
//! - `CF_CLIENT_ID` / `CF_CLIENT_SECRET` - client_credentials grant
//! - `CF_USERNAME` / `CF_PASSWORD` - password grant (used when no client
//!   credentials are set)
//! - `CF_TOKEN_URL` (optional) - UAA token endpoint, discovered from the
//!   API root when unset

mod auth;
mod client;
mod config;
mod error;
mod models;
mod pagination;
mod poll;
mod traits;

pub mod cli;
pub mod output;

// Re-export core types
pub use client::CfClient;
pub use config::{CfConfig, CfGrant};
pub use error::{CfError, Result};
pub use pagination::{Href, ListEnvelope, Page, PageQuery, Pagination};
pub use poll::{poll_until_terminal, Backoff, Operation, PollPolicy, StateKind, TerminalStates};

// Re-export traits
pub use traits::{Create, Delete, Get, List, Update};

// Re-export models
pub use models::*;
