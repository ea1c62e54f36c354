use super::*;
use clap::CommandFactory;

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn global_options_may_follow_the_subcommand() {
    let cli = Cli::parse_from([
        "pagewright",
        "account",
        "Login Page",
        "RegularUser",
        "--field",
        "password",
        "--env",
        "qa",
    ]);

    assert_eq!(cli.options.env.as_deref(), Some("qa"));
    match cli.command {
        Commands::Account {
            page,
            account,
            field,
        } => {
            assert_eq!(page, "Login Page");
            assert_eq!(account, "RegularUser");
            assert_eq!(field.as_deref(), Some("password"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn check_accepts_strict() {
    let cli = Cli::parse_from(["pagewright", "check", "--strict", "--format", "json"]);

    assert!(matches!(cli.command, Commands::Check { strict: true }));
}
