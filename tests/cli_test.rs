use clap::error::ErrorKind;
use clap::Parser;

use session_authority::auth::TokenKind;
use session_authority::cli::{Cli, Command};

fn parse(args: &[&str]) -> Result<Command, clap::Error> {
    Cli::try_parse_from(std::iter::once("authctl").chain(args.iter().copied())).map(|cli| cli.command)
}

#[test]
fn test_generate_key() {
    assert_eq!(parse(&["generate-key"]).unwrap(), Command::GenerateKey);
}

#[test]
fn test_issue_defaults_to_access() {
    assert_eq!(
        parse(&["issue", "alice"]).unwrap(),
        Command::Issue {
            subject: "alice".to_string(),
            kind: TokenKind::Access,
        }
    );
}

#[test]
fn test_issue_refresh() {
    assert_eq!(
        parse(&["issue", "alice", "refresh"]).unwrap(),
        Command::Issue {
            subject: "alice".to_string(),
            kind: TokenKind::Refresh,
        }
    );
}

#[test]
fn test_inspect_with_and_without_kind() {
    assert_eq!(
        parse(&["inspect", "abc.def"]).unwrap(),
        Command::Inspect {
            token: "abc.def".to_string(),
            kind: TokenKind::Access,
        }
    );
    assert_eq!(
        parse(&["inspect", "abc.def", "Refresh"]).unwrap(),
        Command::Inspect {
            token: "abc.def".to_string(),
            kind: TokenKind::Refresh,
        }
    );
}

#[test]
fn test_rejects_bad_input() {
    assert!(parse(&[]).is_err());
    assert!(parse(&["issue"]).is_err());
    assert!(parse(&["issue", "alice", "session"]).is_err());
    assert!(parse(&["issue", "alice", "access", "extra"]).is_err());
    assert!(parse(&["rotate"]).is_err());
}

#[test]
fn test_help_is_not_an_error_exit() {
    let help = parse(&["--help"]).unwrap_err();
    assert_eq!(help.kind(), ErrorKind::DisplayHelp);
    assert_eq!(help.exit_code(), 0);

    let sub_help = parse(&["issue", "--help"]).unwrap_err();
    assert_eq!(sub_help.kind(), ErrorKind::DisplayHelp);
}
