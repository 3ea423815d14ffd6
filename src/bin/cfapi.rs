//! Cloud Foundry API CLI binary.
//!
//! A command-line interface for interacting with the Cloud Foundry V3 API.

use std::process::ExitCode;
use std::time::Duration;

use cfapi::cli::{Cli, Command, Entity};
use cfapi::{
    list_app_revisions, list_app_sidecars, App, AppListQuery, AppUsageEvent, AuditEvent,
    CfClient, Get, Job, List, Organization, OrganizationListQuery, OrganizationQuota, Page,
    PollPolicy, Revision, ServiceInstance, ServiceUsageEvent, Sidecar, Space, SpaceListQuery,
};
use clap::Parser;
use serde::Serialize;
use tabled::{Table, Tabled};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let client = match CfClient::from_env().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set CF_API_URL and CF_USERNAME/CF_PASSWORD or CF_CLIENT_ID/CF_CLIENT_SECRET");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &CfClient, cli: Cli) -> cfapi::Result<()> {
    match cli.command {
        Command::Get { entity, guid } => handle_get(client, entity, guid, cli.json).await,
        Command::List {
            entity,
            page,
            per_page,
            name,
            app,
        } => handle_list(client, entity, page, per_page, name, app.as_deref(), cli.json).await,
        Command::Wait {
            guid,
            timeout,
            interval,
        } => handle_wait(client, &guid, timeout, interval, cli.json).await,
    }
}

async fn handle_get(
    client: &CfClient,
    entity: Entity,
    guid: String,
    json: bool,
) -> cfapi::Result<()> {
    match entity {
        Entity::App => output_single(&App::get(client, guid).await?, json),
        Entity::Org => output_single(&Organization::get(client, guid).await?, json),
        Entity::Space => output_single(&Space::get(client, guid).await?, json),
        Entity::ServiceInstance => {
            output_single(&ServiceInstance::get(client, guid).await?, json)
        }
        Entity::Quota => output_single(&OrganizationQuota::get(client, guid).await?, json),
        Entity::AuditEvent => output_single(&AuditEvent::get(client, guid).await?, json),
        Entity::AppUsageEvent => output_single(&AppUsageEvent::get(client, guid).await?, json),
        Entity::ServiceUsageEvent => {
            output_single(&ServiceUsageEvent::get(client, guid).await?, json)
        }
        Entity::Revision => output_single(&Revision::get(client, guid).await?, json),
        Entity::Sidecar => output_single(&Sidecar::get(client, guid).await?, json),
        Entity::Job => output_single(&Job::get(client, guid).await?, json),
    }
}

async fn handle_list(
    client: &CfClient,
    entity: Entity,
    page: Option<u32>,
    per_page: Option<u32>,
    name: Option<String>,
    app: Option<&str>,
    json: bool,
) -> cfapi::Result<()> {
    let page = page.unwrap_or(1);
    let per_page = per_page.unwrap_or(20);
    let names = name.map(|n| vec![n]).unwrap_or_default();

    match entity {
        Entity::App => {
            let query = AppListQuery {
                names,
                ..Default::default()
            };
            let apps = App::list_page(client, &query, page, per_page).await?;
            output_page(&apps, json, |a| AppRow::from(a))?;
        }
        Entity::Org => {
            let query = OrganizationListQuery {
                names,
                ..Default::default()
            };
            let orgs = Organization::list_page(client, &query, page, per_page).await?;
            output_page(&orgs, json, |o| OrgRow::from(o))?;
        }
        Entity::Space => {
            let query = SpaceListQuery {
                names,
                ..Default::default()
            };
            let spaces = Space::list_page(client, &query, page, per_page).await?;
            output_page(&spaces, json, |s| SpaceRow::from(s))?;
        }
        Entity::ServiceInstance => {
            let query = cfapi::ServiceInstanceListQuery {
                names,
                ..Default::default()
            };
            let instances = ServiceInstance::list_page(client, &query, page, per_page).await?;
            output_page(&instances, json, |i| ServiceInstanceRow::from(i))?;
        }
        Entity::Quota => {
            let query = cfapi::OrganizationQuotaListQuery {
                names,
                ..Default::default()
            };
            let quotas = OrganizationQuota::list_page(client, &query, page, per_page).await?;
            output_page(&quotas, json, |q| QuotaRow::from(q))?;
        }
        Entity::AuditEvent => {
            let events =
                AuditEvent::list_page(client, &Default::default(), page, per_page).await?;
            output_page(&events, json, |e| AuditEventRow::from(e))?;
        }
        Entity::AppUsageEvent => {
            let events =
                AppUsageEvent::list_page(client, &Default::default(), page, per_page).await?;
            println!("{}", serde_json::to_string_pretty(&events.resources)?);
        }
        Entity::ServiceUsageEvent => {
            let events =
                ServiceUsageEvent::list_page(client, &Default::default(), page, per_page)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&events.resources)?);
        }
        Entity::Revision => {
            let app_guid = app.ok_or_else(|| cfapi::CfError::ConfigMissing(
                "--app required for listing revisions".to_string(),
            ))?;
            let revisions = list_app_revisions(client, app_guid, Default::default()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&revisions)?);
            } else {
                let rows: Vec<RevisionRow> = revisions.iter().map(RevisionRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        Entity::Sidecar => {
            let app_guid = app.ok_or_else(|| cfapi::CfError::ConfigMissing(
                "--app required for listing sidecars".to_string(),
            ))?;
            let sidecars = list_app_sidecars(client, app_guid).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sidecars)?);
            } else {
                let rows: Vec<SidecarRow> = sidecars.iter().map(SidecarRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        Entity::Job => {
            eprintln!("Error: Jobs can only be fetched individually");
            eprintln!("Hint: Use 'cfapi get job <guid>' or 'cfapi wait <guid>'");
            return Err(cfapi::CfError::NotFound {
                entity_type: "job list endpoint",
                guid: String::new(),
            });
        }
    }
    Ok(())
}

async fn handle_wait(
    client: &CfClient,
    guid: &str,
    timeout_secs: u64,
    interval_secs: u64,
    json: bool,
) -> cfapi::Result<()> {
    let policy = PollPolicy::with_deadline(
        Duration::from_secs(interval_secs),
        Duration::from_secs(timeout_secs),
    );

    let job = Job::poll_complete(client, guid, &policy, &CancellationToken::new()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        use cfapi::output::PrettyPrint;
        println!("{}", job.pretty_print());
    }
    Ok(())
}

fn output_single<T: Serialize>(item: &T, _json: bool) -> cfapi::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> cfapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.resources)?);
    } else {
        let rows: Vec<R> = page.resources.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!(
            "\nPage {}/{} ({} total results)",
            page.page, page.total_pages, page.total_results
        );
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct AppRow {
    guid: String,
    name: String,
    state: String,
}

impl From<&App> for AppRow {
    fn from(a: &App) -> Self {
        Self {
            guid: a.guid.clone(),
            name: a.name.clone(),
            state: a.state.clone(),
        }
    }
}

#[derive(Tabled)]
struct OrgRow {
    guid: String,
    name: String,
    suspended: bool,
}

impl From<&Organization> for OrgRow {
    fn from(o: &Organization) -> Self {
        Self {
            guid: o.guid.clone(),
            name: o.name.clone(),
            suspended: o.suspended,
        }
    }
}

#[derive(Tabled)]
struct SpaceRow {
    guid: String,
    name: String,
    organization: String,
}

impl From<&Space> for SpaceRow {
    fn from(s: &Space) -> Self {
        Self {
            guid: s.guid.clone(),
            name: s.name.clone(),
            organization: s.organization_guid().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Tabled)]
struct ServiceInstanceRow {
    guid: String,
    name: String,
    #[tabled(rename = "type")]
    instance_type: String,
    #[tabled(rename = "last operation")]
    last_operation: String,
}

impl From<&ServiceInstance> for ServiceInstanceRow {
    fn from(si: &ServiceInstance) -> Self {
        Self {
            guid: si.guid.clone(),
            name: si.name.clone(),
            instance_type: si.instance_type.clone(),
            last_operation: si
                .last_operation
                .as_ref()
                .map(|lo| format!("{} {}", lo.operation_type, lo.state))
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct QuotaRow {
    guid: String,
    name: String,
    #[tabled(rename = "memory (mb)")]
    memory: String,
}

impl From<&OrganizationQuota> for QuotaRow {
    fn from(q: &OrganizationQuota) -> Self {
        Self {
            guid: q.guid.clone(),
            name: q.name.clone(),
            memory: q
                .apps
                .total_memory_in_mb
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unlimited".to_string()),
        }
    }
}

#[derive(Tabled)]
struct AuditEventRow {
    guid: String,
    #[tabled(rename = "type")]
    event_type: String,
    actor: String,
    target: String,
}

impl From<&AuditEvent> for AuditEventRow {
    fn from(e: &AuditEvent) -> Self {
        Self {
            guid: e.guid.clone(),
            event_type: e.event_type.clone(),
            actor: e
                .actor
                .as_ref()
                .and_then(|a| a.name.clone())
                .unwrap_or_default(),
            target: e
                .target
                .as_ref()
                .and_then(|t| t.name.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct RevisionRow {
    guid: String,
    version: u64,
    deployable: bool,
}

impl From<&Revision> for RevisionRow {
    fn from(r: &Revision) -> Self {
        Self {
            guid: r.guid.clone(),
            version: r.version,
            deployable: r.deployable,
        }
    }
}

#[derive(Tabled)]
struct SidecarRow {
    guid: String,
    name: String,
    command: String,
}

impl From<&Sidecar> for SidecarRow {
    fn from(s: &Sidecar) -> Self {
        Self {
            guid: s.guid.clone(),
            name: s.name.clone(),
            command: s.command.clone(),
        }
    }
}
