use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use vibecoders::onboarding::{self, OnboardingDraft};
use vibecoders::storage::FileStorage;
use vibecoders::transport::ReqwestTransport;
use vibecoders::{ApiClient, ClientConfig, ClientError, SessionManager, TokenStore, User};

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not determine home directory; pass --token-file or set VIBE_TOKEN_FILE")]
    NoHomeDir,
    #[error("not signed in; run `vibecoders-cli login` first")]
    NotSignedIn,
    #[error("{}", .0.user_message())]
    Client(#[from] ClientError),
    #[error("invalid onboarding answers: {0}")]
    Onboarding(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "vibecoders-cli", about = "Vibecoders account and API CLI")]
struct Cli {
    /// Backend base URL, endpoint paths are appended to it.
    #[arg(long, env = "VIBE_API_BASE_URL")]
    base_url: Option<String>,

    /// Where the token pair is persisted between runs.
    #[arg(long, env = "VIBE_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the token pair.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VIBE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new account (does not sign in).
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "VIBE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored tokens.
    Logout,
    /// Restore the stored session and print the signed-in user.
    Whoami,
    /// Authenticated GET of a backend path, printed as JSON.
    Get { path: String },
    /// Submit the study-profile questionnaire.
    Onboard(OnboardArgs),
}

#[derive(Args, Debug)]
struct OnboardArgs {
    #[arg(long)]
    year: String,
    #[arg(long)]
    major: String,
    #[arg(long = "favorite", required = true)]
    favorite_topics: Vec<String>,
    #[arg(long = "interest", required = true)]
    interested_topics: Vec<String>,
}

impl OnboardArgs {
    fn into_draft(self) -> OnboardingDraft {
        OnboardingDraft {
            year: self.year,
            major: self.major,
            favorite_topics: self.favorite_topics,
            interested_topics: self.interested_topics,
        }
    }
}

type CliSession = SessionManager<ReqwestTransport>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = build_session(cli.base_url.as_deref(), cli.token_file)?;

    match cli.command {
        Command::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("signed in as {}", describe_user(&user));
            Ok(())
        }
        Command::Signup { name, email, password } => {
            session.signup(&name, &email, &password).await?;
            println!("account created for {email}; run `vibecoders-cli login` to sign in");
            Ok(())
        }
        Command::Logout => {
            session.logout();
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            let user = require_user(&session).await?;
            println!("{}", describe_user(&user));
            Ok(())
        }
        Command::Get { path } => {
            let json: Value = session.client().get_json(&path).await?;
            print_json(&json)
        }
        Command::Onboard(args) => {
            let request = args.into_draft().to_request().map_err(CliError::Onboarding)?;
            require_user(&session).await?;
            onboarding::submit(&session, &request).await?;
            println!("onboarding saved");
            Ok(())
        }
    }
}

fn build_session(base_url: Option<&str>, token_file: Option<PathBuf>) -> Result<CliSession, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = base_url {
        config = ClientConfig { timeouts: config.timeouts, ..ClientConfig::new(base_url)? };
    }
    let token_file = resolve_token_file(token_file, dirs::home_dir())?;
    tracing::debug!(base_url = %config.base_url, token_file = %token_file.display(), "cli session");

    let transport = ReqwestTransport::new(config.timeouts)?;
    let tokens = TokenStore::new(FileStorage::open(token_file));
    Ok(SessionManager::new(ApiClient::new(config, tokens, transport)))
}

fn resolve_token_file(explicit: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    home.map(|h| h.join(".config").join("vibecoders").join("tokens.json"))
        .ok_or(CliError::NoHomeDir)
}

async fn require_user(session: &CliSession) -> Result<User, CliError> {
    session.bootstrap().await;
    session.user().ok_or(CliError::NotSignedIn)
}

fn describe_user(user: &User) -> String {
    let onboarding = if user.onboarding { "" } else { " (onboarding pending)" };
    format!("{} <{}> [{}]{onboarding}", user.name, user.email, user.id)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
