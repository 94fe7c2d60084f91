//! Mini Overflow command-line client
//!
//! Talks to the Q&A backend through `qa-api`. The token pair is kept in a
//! session file between runs; expired access tokens are refreshed
//! transparently by the client.

mod command;
mod config;
mod render;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use api_client::{ApiClient, ApiError, Registration};
use clap::Parser;
use qa_api::{QaClient, describe};
use session_store::{FileStore, SessionStore, decode_unverified};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::{Cli, Command};
use crate::config::Config;

const LOGIN_HINT: &str = "Run `overflow login <username> <password>` to start a new session.";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // JSON logs on stderr, quiet unless LOG_LEVEL / RUST_LOG asks otherwise
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config_path = Config::resolve_path(cli.config.as_deref());
    debug!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let session_path = config.session_path();
    let store = FileStore::load(session_path.clone())
        .await
        .with_context(|| format!("failed to open session file {}", session_path.display()))?;

    let api = ApiClient::new(config.client_config(), Arc::new(store))?;
    info!(base_url = api.base_url(), session = %session_path.display(), "client ready");

    execute(&QaClient::new(api), cli.command).await
}

async fn execute(qa: &QaClient, command: Command) -> Result<String> {
    let output = match command {
        Command::Login { username, password } => {
            match qa.api().login(&username, &password).await {
                Err(e) if e.is_unauthorized() => {
                    anyhow::bail!(
                        "{}",
                        e.detail().unwrap_or("Invalid username or password.")
                    )
                }
                result => result?,
            }
            format!("Logged in as {username}.\n")
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            qa.api()
                .register(&Registration::new(username.as_str(), email, password))
                .await?;
            format!("Account {username} created. Run `overflow login {username} <password>` to sign in.\n")
        }
        Command::Logout => {
            qa.api().logout().await?;
            "Logged out.\n".into()
        }
        Command::Status => status(qa.api().store().as_ref()).await?,
        Command::Questions(args) => render::question_list(&qa.list_questions(&args.into()).await?),
        Command::Show { id } => render::question(&qa.get_question(id).await?),
        Command::Ask(args) => {
            let created = qa.ask(&args.into()).await?;
            format!("Question #{} posted.\n", created.id)
        }
        Command::Answer {
            question_id,
            content,
        } => {
            let answer = qa.answer(question_id, &content).await?;
            format!("Answer #{} posted on question #{question_id}.\n", answer.id)
        }
        Command::EditAnswer { answer_id, content } => {
            qa.edit_answer(answer_id, &content).await?;
            format!("Answer #{answer_id} updated.\n")
        }
        Command::DeleteAnswer { answer_id } => {
            qa.delete_answer(answer_id).await?;
            format!("Answer #{answer_id} deleted.\n")
        }
        Command::Comment { answer_id, content } => {
            let comment = qa.comment(answer_id, &content).await?;
            format!("Comment #{} added to answer #{answer_id}.\n", comment.id)
        }
        Command::Vote {
            target,
            id,
            direction,
        } => render::vote(&qa.vote(target.at(id), direction.into()).await?),
        Command::Accept { answer_id } => {
            qa.accept(answer_id).await?;
            format!("Answer #{answer_id} accepted.\n")
        }
        Command::Tags => render::tags(&qa.tags().await?),
        Command::Profile => render::profile(&qa.profile().await?),
        Command::User { id } => render::user(&qa.user(id).await?),
    };
    Ok(output)
}

/// Describe the stored session without contacting the server.
async fn status(store: &dyn SessionStore) -> Result<String> {
    let snapshot = store.snapshot().await?;
    let claims = snapshot.access.as_ref().map(|token| {
        decode_unverified(token.expose()).unwrap_or_else(|e| {
            debug!(error = %e, "access token payload unreadable");
            Default::default()
        })
    });
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Ok(render::status(claims.as_ref(), snapshot.refresh.is_some(), now))
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api) => {
            eprintln!("{}", describe(api));
            if api.is_unauthorized() {
                eprintln!("{LOGIN_HINT}");
            }
        }
        None => eprintln!("error: {err:#}"),
    }
}
