#![warn(clippy::pedantic)]

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use secrecy::SecretString;

mod checkout;
mod classify;
mod cli;
mod event;
#[cfg(test)]
mod fixtures;
mod format;
mod github;
mod pipeline;
mod queue;
mod signing;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_tracing(cli.debug);

    // If the token has not been passed via CLI or env, get it as a credential.
    let token = cli
        .gh_token
        .clone()
        .map(SecretString::new)
        .ok_or(())
        .or_else(|()| utils::get_credential("gh_token"))?;
    let github = github::OctocrabGitHub::new(Arc::new(cli::github_client(&token)?));
    std::mem::drop(token);

    let pipeline = pipeline::Pipeline::new(
        cli.pipeline_config(),
        github,
        checkout::GitCheckout,
        cli.formatter()?,
    );
    let source =
        queue::NsqSource::connect(&cli.lookupd_addr, &cli.topic, &cli.channel, cli.workers)?;
    tracing::info!(
        "Consuming {}/{} via {} with {} worker(s)",
        cli.topic,
        cli.channel,
        cli.lookupd_addr,
        cli.workers
    );

    queue::consume(source, Arc::new(pipeline), cli.consumer_options()).await?;
    bail!("NSQ subscription to {}/{} closed", cli.topic, cli.channel);
}
