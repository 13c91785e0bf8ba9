//! KeywordForge CLI — keyword clustering and content planning tool.
//!
//! Turns raw keyword lists into named semantic clusters, content outlines,
//! post ideas, and a downloadable report.

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
