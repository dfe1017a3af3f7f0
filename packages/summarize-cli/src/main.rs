// Command-line entry point: read references, summarize, print results

mod config;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use summarize::{build_backend, exit_code, read_references, render, Acquirers, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in .env during development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let pipeline_config = cli.pipeline_config().context("Invalid pipeline options")?;
    let backend_config = cli.backend_config().context("Invalid backend options")?;

    let backend = build_backend(&backend_config).context("Failed to configure summarization backend")?;
    tracing::info!(
        provider = %backend_config.provider,
        model = backend_config.model(),
        permits = backend_config.permits,
        "Backend ready"
    );

    let acquirers = Acquirers::standard().context("Failed to build acquirers")?;
    let pipeline = Pipeline::new(backend, acquirers, pipeline_config).context("Failed to build pipeline")?;

    let references = read_references(cli.input.as_deref())
        .await
        .context("Failed to read references")?;
    tracing::info!(count = references.len(), "References loaded");

    let results = pipeline.run(&references).await;

    let rendered = render(&results, cli.format).context("Failed to render results")?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write results")?;

    let code = exit_code(&results);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
