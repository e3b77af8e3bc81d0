use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Run the web server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start a chat session in the terminal
    Chat {
        /// Model to start with, must be on the allow-list
        #[arg(long)]
        model: Option<String>,
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

    // A missing API key or a bad model list is fatal before anything
    // starts
    let config = AppConfig::from_env()?;

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat { model }) => {
            chat::run(config, model).await?;
        }
        None => {}
    }

    Ok(())
}
