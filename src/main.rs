//! gapicmd
//!
//! Interact with Gini's API service from the command line.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Cli, handle_command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    rusty_gini::init_tracing(if cli.debug { "debug" } else { "warn" });

    handle_command(cli).await
}
