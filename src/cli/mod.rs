use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Chat {
        /// Conversation key used to load and save session state
        #[arg(long, default_value = "local")]
        session: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Some(Command::Chat { session }) => chat::run(&session).await?,
        None => chat::run("local").await?,
    }

    Ok(())
}
