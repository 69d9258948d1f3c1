use agent_hub::tooling::cli::{AgentsCommands, Cli, Commands, OutputFormat};
use clap::{CommandFactory, Parser};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["agent-hub", "sync"],
        vec!["agent-hub", "agents", "list"],
        vec!["agent-hub", "agents", "list", "--tag", "etl", "--format", "json"],
        vec!["agent-hub", "agents", "show", "job-enricher"],
        vec!["agent-hub", "prompt", "get", "job-enricher", "--refresh"],
        vec!["agent-hub", "prompt", "get", "job-enricher", "--version", "v2"],
        vec!["agent-hub", "prompt", "versions", "job-enricher"],
        vec![
            "agent-hub", "prompt", "set", "job-enricher", "v2", "--file", "p.txt", "--note",
            "tweak", "--no-current",
        ],
        vec!["agent-hub", "prompt", "promote", "job-enricher", "v1"],
        vec!["agent-hub", "--local-only", "--local-dir", "/tmp/hub", "run-id", "a"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    assert!(Cli::try_parse_from(["agent-hub", "prompt", "set", "a", "v1"]).is_err());
    assert!(Cli::try_parse_from(["agent-hub", "agents", "list", "--format", "yaml"]).is_err());
    assert!(Cli::try_parse_from([
        "agent-hub", "prompt", "get", "a", "--version", "v1", "--refresh"
    ])
    .is_err());
}

#[test]
fn format_flag_parses_into_enum() {
    let cli = Cli::try_parse_from(["agent-hub", "agents", "show", "a", "--format", "json"]).unwrap();
    match cli.command {
        Commands::Agents {
            command: AgentsCommands::Show { agent_id, format },
        } => {
            assert_eq!(agent_id, "a");
            assert_eq!(format, OutputFormat::Json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
