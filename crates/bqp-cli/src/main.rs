//! bqport CLI - deploy a tree of SQL files to BigQuery and reconcile remote state

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod reporter;

use cli::Cli;
use commands::{bundle, push};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Push(args) => push::execute(args, &cli.global).await,
        cli::Commands::Bundle(args) => bundle::execute(args, &cli.global).await,
    }
}
