use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rank_tracker::collector::Collector;
use rank_tracker::config::Config;
use rank_tracker::history::MergeOutcome;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collect")]
#[command(about = "fetch today's ranking snapshot and merge it into the history file", long_about = None)]
struct Cli {
    /// Account to track (overrides RANK_USERNAME)
    #[arg(short, long)]
    username: Option<String>,

    /// GraphQL endpoint (overrides RANK_GRAPHQL_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// History file to update (overrides RANK_DATA_FILE)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("collect=info,rank_tracker=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(username) = cli.username {
        config.username = username;
    }
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    let collector = Collector::new(config).context("failed to set up collector")?;
    let report = collector.run().await.map_err(|e| {
        tracing::error!("collection failed: {}", e);
        e
    })?;

    let action = match report.outcome {
        MergeOutcome::Inserted => "added",
        MergeOutcome::Replaced { .. } => "updated",
    };
    println!(
        "{} today's entry, saved {} ({} records)",
        action,
        report.path.display(),
        report.total
    );

    Ok(())
}
