mod auth;
mod cli;
mod config;
mod error;
mod jobs;
mod output;
mod providers;
mod rules;
mod skips;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting gatekeeper");
    cli.execute().await
}
