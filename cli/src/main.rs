//! `todos`: command line host for the todo client core.
//!
//! Every invocation loads the user's list, runs one operation through a
//! `Session`, then prints the resulting view and any notice. The process
//! exits non-zero when the operation left a notice up.

mod config;
mod render;
mod transport;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use todos_core::{EditState, RowEditor, Session, StoreError, TodoClient, TodoStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Cli, Command, Config, ConfigError, SETUP_INSTRUCTIONS};
use transport::ReqwestTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(ConfigError::MissingUserId) => {
            eprint!("{SETUP_INSTRUCTIONS}");
            return Ok(ExitCode::from(2));
        }
        Err(e) => bail!(e),
    };
    info!(api_url = %config.api_url, user_id = config.user_id, "starting session");

    let store = TodoStore::new(TodoClient::new(&config.api_url, config.user_id));
    let mut session = Session::new(store, ReqwestTransport::new());

    let command = cli.command.unwrap_or(Command::List);
    if let Some(line) = load_then_run(&mut session, command).await? {
        println!("{line}");
    }

    let now = Instant::now();
    print!("{}", render::render(session.store(), cli.filter, now));
    Ok(if session.store().notice(now).is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Load the list, then run `command` against it. When the load fails only
/// `List` proceeds; anything else would act on a stale list and clear the
/// load notice.
async fn load_then_run(session: &mut Session<ReqwestTransport>, command: Command) -> Result<Option<String>> {
    if session.load().await.is_err() && command != Command::List {
        return Ok(None);
    }
    run(session, command).await
}

/// Run one command. Operation failures surface as the store's notice;
/// only addressing a todo that does not exist is an error here.
async fn run(session: &mut Session<ReqwestTransport>, command: Command) -> Result<Option<String>> {
    let result = match command {
        Command::List => Ok(None),
        Command::Add { title } => session
            .add(&title.join(" "))
            .await
            .map(|todo| Some(format!("added {}", todo.id))),
        Command::Toggle { id } => session.toggle_one(id).await.map(|_| None),
        Command::ToggleAll => session.toggle_all().await.map(|_| None),
        Command::Remove { id } => session.remove(id).await.map(|_| None),
        Command::ClearCompleted => {
            let report = session.clear_completed().await;
            Ok(Some(format!("cleared {}", report.succeeded.len())))
        }
        Command::Rename { id, title } => {
            let Some(todo) = session.store().find(id) else {
                bail!(StoreError::UnknownTodo(id));
            };
            let mut editor = RowEditor::new(todo);
            editor.start_editing();
            editor.set_draft(title.join(" "));
            session.commit_edit(&mut editor).await.map(|()| match editor.state() {
                EditState::Deleted => Some(format!("deleted {id}")),
                _ => None,
            })
        }
    };
    match result {
        Err(StoreError::UnknownTodo(id)) => bail!("no todo with id {id}"),
        Err(_) => Ok(None),
        Ok(line) => Ok(line),
    }
}
