use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn run_args_parse() {
    let cli = Cli::parse_from([
        "strata",
        "run",
        "--select",
        "orders,customers",
        "--threads",
        "2",
        "--full-refresh",
    ]);
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.select.as_deref(), Some("orders,customers"));
            assert_eq!(args.threads, 2);
            assert!(args.full_refresh);
        }
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn threads_defaults_to_four() {
    let cli = Cli::parse_from(["strata", "run"]);
    match cli.command {
        Commands::Run(args) => assert_eq!(args.threads, 4),
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn project_dir_is_global() {
    let cli = Cli::parse_from(["strata", "ls", "-p", "/tmp/proj"]);
    assert_eq!(cli.global.project_dir, "/tmp/proj");
}
