//! Basic example demonstrating the Cloud Foundry API client.
//!
//! Run with:
//! ```
//! CF_API_URL=https://api.sys.example.com \
//! CF_USERNAME=admin CF_PASSWORD=secret \
//! cargo run --example basic
//! ```

use cfapi::{App, AppListQuery, CfClient, Get, List, Organization, Space, SpaceListQuery};

#[tokio::main]
async fn main() -> cfapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Cloud Foundry client...");
    let client = CfClient::from_env().await?;
    println!("Connected to: {}", client.base_url());

    // List first page of organizations
    println!("\n--- Listing Organizations (first page) ---");
    let orgs_page = Organization::list_page(&client, &Default::default(), 1, 10).await?;
    println!(
        "Found {} organizations (total: {})",
        orgs_page.len(),
        orgs_page.total_results
    );

    for org in &orgs_page {
        println!("  - {} ({})", org.name, org.guid);
    }

    // Walk into the first organization
    if let Some(first_org) = orgs_page.resources.first() {
        println!("\n--- Getting Organization Details ---");
        let org = Organization::get(&client, first_org.guid.clone()).await?;
        println!("Organization: {}", org.name);
        println!("  GUID: {}", org.guid);
        println!("  Suspended: {}", org.suspended);
        if let Some(quota) = org.quota_guid() {
            println!("  Quota: {}", quota);
        }

        // List spaces in this organization
        println!("\n--- Listing Spaces ---");
        let spaces_query = SpaceListQuery {
            organization_guids: vec![org.guid.clone()],
            ..Default::default()
        };
        let spaces = Space::list_all(&client, &spaces_query).await?;
        println!("Found {} spaces", spaces.len());

        for space in spaces.iter().take(5) {
            println!("  - {} ({})", space.name, space.guid);
        }

        // List apps in the first space
        if let Some(first_space) = spaces.first() {
            println!("\n--- Listing Apps in '{}' ---", first_space.name);
            let apps_query = AppListQuery {
                space_guids: vec![first_space.guid.clone()],
                ..Default::default()
            };
            let apps = App::list_all(&client, &apps_query).await?;
            println!("Found {} apps", apps.len());

            for app in apps.iter().take(5) {
                let running = if app.is_started() { "started" } else { "stopped" };
                println!("  - {} ({})", app.name, running);
            }

            // Show details for the first app
            if let Some(first_app) = apps.first() {
                println!("\n--- App Details ---");
                let app = App::get(&client, first_app.guid.clone()).await?;
                println!("  Name: {}", app.name);
                println!("  State: {}", app.state);
                if let Some(ref lifecycle) = app.lifecycle {
                    println!("  Lifecycle: {}", lifecycle.lifecycle_type);
                }

                // Revisions record each deploy of the app
                println!("\n--- Revisions ---");
                let revisions =
                    cfapi::list_app_revisions(&client, &app.guid, Default::default()).await?;
                println!("Found {} revisions", revisions.len());
                for rev in revisions.iter().take(5) {
                    let deployable = if rev.deployable { "deployable" } else { "retired" };
                    println!(
                        "  v{} - {} ({})",
                        rev.version,
                        rev.description.as_deref().unwrap_or("no description"),
                        deployable
                    );
                }
            }
        }
    }

    println!("\nDone!");
    Ok(())
}
