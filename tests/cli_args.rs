//! CLI argument parsing tests

use clap::Parser;
use etf2l::cli::{Cli, Command, Entity, Resource};

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["etf2l", "get", "player", "76561197970669109"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { entity, id } => {
            assert_eq!(entity, Entity::Player);
            assert_eq!(id, "76561197970669109");
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_list_subcommand() {
    let cli = Cli::parse_from(["etf2l", "list", "bans"]);

    match cli.command {
        Command::List {
            resource,
            id,
            recursive,
        } => {
            assert_eq!(resource, Resource::Bans);
            assert_eq!(id, None);
            assert!(!recursive);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_list_with_id_and_recursion() {
    let cli = Cli::parse_from(["etf2l", "list", "team-transfers", "--id", "31", "-r"]);

    match cli.command {
        Command::List {
            resource,
            id,
            recursive,
        } => {
            assert_eq!(resource, Resource::TeamTransfers);
            assert_eq!(id.as_deref(), Some("31"));
            assert!(recursive);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_global_json_flag() {
    // --json before subcommand
    let cli = Cli::parse_from(["etf2l", "--json", "list", "whitelists"]);
    assert!(cli.json);

    // --json after subcommand (global flag)
    let cli = Cli::parse_from(["etf2l", "list", "whitelists", "--json"]);
    assert!(cli.json);
}

#[test]
fn test_entity_variants() {
    let cli = Cli::parse_from(["etf2l", "get", "teams", "31"]);
    assert!(matches!(cli.command, Command::Get { entity: Entity::Team, .. }));

    let cli = Cli::parse_from(["etf2l", "get", "competition", "700"]);
    assert!(matches!(cli.command, Command::Get { entity: Entity::Competition, .. }));

    let cli = Cli::parse_from(["etf2l", "get", "match", "10"]);
    assert!(matches!(cli.command, Command::Get { entity: Entity::Match, .. }));

    let cli = Cli::parse_from(["etf2l", "get", "tables", "700"]);
    assert!(matches!(cli.command, Command::Get { entity: Entity::Tables, .. }));
}

#[test]
fn test_unknown_resource_is_rejected() {
    assert!(Cli::try_parse_from(["etf2l", "list", "projects"]).is_err());
}

#[test]
fn test_scoped_resources_need_an_id() {
    assert!(Resource::PlayerResults.needs_id());
    assert!(Resource::CompetitionMatches.needs_id());
    assert!(!Resource::Bans.needs_id());
    assert!(!Resource::Whitelists.needs_id());
}
