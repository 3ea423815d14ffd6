//! CLI argument parsing tests.

use cfapi::cli::{Cli, Command, Entity};
use clap::Parser;

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["cfapi", "get", "app", "585bc3c1-3743-497d-88b0-403ad6b56d16"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { entity, guid } => {
            assert!(matches!(entity, Entity::App));
            assert_eq!(guid, "585bc3c1-3743-497d-88b0-403ad6b56d16");
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_list_subcommand() {
    let cli = Cli::parse_from(["cfapi", "list", "orgs"]);

    assert!(!cli.json);
    match cli.command {
        Command::List { entity, .. } => {
            assert!(matches!(entity, Entity::Org));
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_global_json_flag() {
    // --json before subcommand
    let cli = Cli::parse_from(["cfapi", "--json", "list", "apps"]);
    assert!(cli.json);

    // --json after subcommand (global flag)
    let cli = Cli::parse_from(["cfapi", "list", "apps", "--json"]);
    assert!(cli.json);
}

#[test]
fn test_list_pagination_args() {
    let cli = Cli::parse_from(["cfapi", "list", "spaces", "--page", "2", "--per-page", "50"]);

    match cli.command {
        Command::List { page, per_page, .. } => {
            assert_eq!(page, Some(2));
            assert_eq!(per_page, Some(50));
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_list_name_filter_and_app_scope() {
    let cli = Cli::parse_from(["cfapi", "list", "apps", "--name", "frontend"]);
    match cli.command {
        Command::List { name, .. } => assert_eq!(name, Some("frontend".to_string())),
        _ => panic!("Expected List command"),
    }

    let cli = Cli::parse_from(["cfapi", "list", "revisions", "--app", "app-guid"]);
    match cli.command {
        Command::List { entity, app, .. } => {
            assert!(matches!(entity, Entity::Revision));
            assert_eq!(app, Some("app-guid".to_string()));
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_wait_subcommand_defaults() {
    let cli = Cli::parse_from(["cfapi", "wait", "job-guid"]);

    match cli.command {
        Command::Wait {
            guid,
            timeout,
            interval,
        } => {
            assert_eq!(guid, "job-guid");
            assert_eq!(timeout, 300);
            assert_eq!(interval, 5);
        }
        _ => panic!("Expected Wait command"),
    }
}

#[test]
fn test_wait_subcommand_overrides() {
    let cli = Cli::parse_from([
        "cfapi", "wait", "job-guid", "--timeout", "60", "--interval", "2",
    ]);

    match cli.command {
        Command::Wait {
            timeout, interval, ..
        } => {
            assert_eq!(timeout, 60);
            assert_eq!(interval, 2);
        }
        _ => panic!("Expected Wait command"),
    }
}

#[test]
fn test_entity_variants_and_aliases() {
    let cli = Cli::parse_from(["cfapi", "get", "service-instance", "guid"]);
    assert!(matches!(
        cli.command,
        Command::Get { entity: Entity::ServiceInstance, .. }
    ));

    let cli = Cli::parse_from(["cfapi", "list", "organizations"]);
    assert!(matches!(
        cli.command,
        Command::List { entity: Entity::Org, .. }
    ));

    let cli = Cli::parse_from(["cfapi", "list", "quotas"]);
    assert!(matches!(
        cli.command,
        Command::List { entity: Entity::Quota, .. }
    ));

    let cli = Cli::parse_from(["cfapi", "get", "job", "guid"]);
    assert!(matches!(
        cli.command,
        Command::Get { entity: Entity::Job, .. }
    ));

    let cli = Cli::parse_from(["cfapi", "list", "audit-events"]);
    assert!(matches!(
        cli.command,
        Command::List { entity: Entity::AuditEvent, .. }
    ));
}
