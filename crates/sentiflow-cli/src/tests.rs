use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["sentiflow", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["sentiflow", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_seed_command() {
    let cli = Cli::try_parse_from(["sentiflow", "db", "seed"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["sentiflow"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn run_defaults_to_live_run() {
    let cli = Cli::try_parse_from(["sentiflow", "run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run { dry_run: false })
    ));
}

#[test]
fn run_accepts_dry_run() {
    let cli = Cli::try_parse_from(["sentiflow", "run", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Run { dry_run: true })));
}

#[test]
fn parses_queries_command() {
    let cli = Cli::try_parse_from(["sentiflow", "queries"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Queries)));
}

#[test]
fn status_defaults() {
    let cli = Cli::try_parse_from(["sentiflow", "status"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Status {
            entity: None,
            limit: 20
        })
    ));
}

#[test]
fn status_with_entity_and_limit() {
    let cli = Cli::try_parse_from([
        "sentiflow", "status", "--entity", "Swiggy", "--limit", "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Status {
            entity: Some(ref e),
            limit: 5
        }) if e == "Swiggy"
    ));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["sentiflow", "collect"]).is_err());
}

#[test]
fn dry_run_is_not_a_db_flag() {
    assert!(Cli::try_parse_from(["sentiflow", "db", "seed", "--dry-run"]).is_err());
}
