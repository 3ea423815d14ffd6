//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the cfapi binary.

use clap::{Parser, Subcommand, ValueEnum};

/// Cloud Foundry API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "cfapi", about = "Cloud Foundry V3 API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single resource by GUID.
    Get {
        /// The type of resource to get.
        entity: Entity,

        /// The resource GUID.
        guid: String,
    },

    /// List resources with optional filtering and pagination.
    List {
        /// The type of resource to list.
        entity: Entity,

        /// Page number (1-indexed).
        #[arg(long)]
        page: Option<u32>,

        /// Number of results per page.
        #[arg(long)]
        per_page: Option<u32>,

        /// Filter by resource name.
        #[arg(long)]
        name: Option<String>,

        /// App GUID (required for revisions and sidecars).
        #[arg(long)]
        app: Option<String>,
    },

    /// Wait for a job to reach a terminal state.
    Wait {
        /// The job GUID.
        guid: String,

        /// Maximum time to wait in seconds.
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// Polling interval in seconds.
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}

/// Resource types that can be operated on.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// An application.
    #[value(alias = "apps")]
    App,
    /// An organization.
    #[value(alias = "orgs", alias = "organization", alias = "organizations")]
    Org,
    /// A space.
    #[value(alias = "spaces")]
    Space,
    /// A service instance.
    #[value(alias = "service-instances")]
    ServiceInstance,
    /// An organization quota.
    #[value(alias = "quotas")]
    Quota,
    /// An audit event.
    #[value(alias = "audit-events")]
    AuditEvent,
    /// An app usage event.
    #[value(alias = "app-usage-events")]
    AppUsageEvent,
    /// A service usage event.
    #[value(alias = "service-usage-events")]
    ServiceUsageEvent,
    /// An app revision.
    #[value(alias = "revisions")]
    Revision,
    /// A sidecar.
    #[value(alias = "sidecars")]
    Sidecar,
    /// An asynchronous job.
    #[value(alias = "jobs")]
    Job,
}
