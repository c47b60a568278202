pub mod cli;
pub mod commands;
pub mod config;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tasklist_app::{Store, TaskActions};
use tasklist_core::gateway::HttpGateway;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, CliCommand, ListArgs};

/// Resolve configuration, open a session against the HTTP collection and run the requested command.
pub async fn run<W: Write>(cli: Cli, writer: W) -> Result<()> {
    init_tracing(cli.log_filter.clone())?;

    let config = config::from_cli(&cli).context("failed to resolve configuration")?;
    if config.user().is_none() {
        tracing::warn!("no user id configured; nothing will be loaded");
    }
    let gateway = HttpGateway::new(&config).context("failed to build HTTP client")?;
    tracing::debug!(api_url = config.api_url(), "session started");

    let actions = TaskActions::new(Store::new(), Arc::new(gateway), config.user());
    let command = cli
        .command
        .unwrap_or_else(|| CliCommand::List(ListArgs::default()));
    commands::execute(&actions, command, writer).await
}

/// Run the CLI by creating an internal Tokio runtime.
pub fn run_blocking<W: Write>(cli: Cli, writer: W) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run(cli, writer))
}

fn init_tracing(filter: Option<String>) -> Result<()> {
    let filter = filter.unwrap_or_else(|| "warn".to_string());
    let directive: Directive = filter.parse()?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
