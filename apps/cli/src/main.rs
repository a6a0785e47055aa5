//! Daily Bread: posts the day's scheduled Bible reading to Discord.
//!
//! Looks up today's reference in the reading plan, fetches the passage in
//! English and Korean, and posts both to a webhook.

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
