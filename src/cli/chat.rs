use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat::commands;
use crate::chat::exchange::handle_text;
use crate::chat::models::ConversationState;
use crate::chat::store::{SessionStore, SqliteStore};
use crate::core::AppConfig;

pub async fn run(session_key: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let store = SqliteStore::open(&config.db_path).await?;

    // Created lazily on first contact, restored on every later run
    let mut state = store
        .load(session_key)
        .await?
        .unwrap_or_else(ConversationState::new);

    println!("{}", state.persona().welcome_message);

    let mut rl = DefaultEditor::new().expect("Editor failed");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let reply = if let Some(command) = commands::parse(line) {
                    commands::apply(command, &mut state, &config)
                } else {
                    handle_text(&mut state, line, &config).await
                };

                println!("{}", reply);
                store.save(session_key, &state).await?;
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
