//! ao3recs CLI: recommends archive works similar to a given one.
//!
//! Reads work URLs from the command line or an interactive prompt and prints
//! each recommendation as soon as it is found.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
