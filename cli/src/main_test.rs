use std::path::{Path, PathBuf};

use clap::Parser;

use super::*;

fn user(onboarding: bool) -> User {
    User {
        id: "7".to_owned(),
        name: "Alice".to_owned(),
        email: "alice@example.com".to_owned(),
        onboarding,
    }
}

#[test]
fn explicit_token_file_wins() {
    let path = resolve_token_file(Some(PathBuf::from("/tmp/t.json")), Some(PathBuf::from("/home/a"))).unwrap();
    assert_eq!(path, Path::new("/tmp/t.json"));
}

#[test]
fn token_file_defaults_under_home_config() {
    let path = resolve_token_file(None, Some(PathBuf::from("/home/a"))).unwrap();
    assert_eq!(path, Path::new("/home/a/.config/vibecoders/tokens.json"));
}

#[test]
fn token_file_without_home_is_an_error() {
    assert!(matches!(resolve_token_file(None, None), Err(CliError::NoHomeDir)));
}

#[test]
fn describe_user_flags_pending_onboarding() {
    assert_eq!(describe_user(&user(true)), "Alice <alice@example.com> [7]");
    assert_eq!(describe_user(&user(false)), "Alice <alice@example.com> [7] (onboarding pending)");
}

#[test]
fn client_errors_render_user_message() {
    let err = CliError::from(ClientError::Status { status: 401, body: String::new() });
    assert_eq!(err.to_string(), "Invalid email or password.");
}

#[test]
fn onboard_collects_repeated_topics() {
    let cli = Cli::try_parse_from([
        "vibecoders-cli",
        "onboard",
        "--year",
        "2",
        "--major",
        "Law",
        "--favorite",
        "Programming",
        "--favorite",
        "Design",
        "--interest",
        "Travel",
    ])
    .unwrap();
    let Command::Onboard(args) = cli.command else {
        panic!("expected onboard");
    };
    let draft = args.into_draft();
    assert_eq!(draft.favorite_topics, vec!["Programming".to_owned(), "Design".to_owned()]);
    assert_eq!(draft.to_request().unwrap().number_of_years, 2);
}

#[test]
fn get_requires_a_path() {
    assert!(Cli::try_parse_from(["vibecoders-cli", "get"]).is_err());
}
