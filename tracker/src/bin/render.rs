use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rank_tracker::presenter::{self, PageState};
use rank_tracker::{chart_image, page};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "render")]
#[command(about = "fetch data.json over HTTP and write the static ranking page", long_about = None)]
struct Cli {
    /// URL of the history file (overrides RANK_DATA_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Directory to write index.html into
    #[arg(short, long, default_value = "public")]
    out_dir: PathBuf,

    /// Also write chart.png next to the page
    #[arg(long)]
    png: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("render=info,rank_tracker=info")),
        )
        .init();

    let cli = Cli::parse();
    let url = cli
        .url
        .or_else(|| std::env::var("RANK_DATA_URL").ok())
        .context("no data URL given (pass --url or set RANK_DATA_URL)")?;

    let client = reqwest::Client::new();
    let state = presenter::load(&client, &url).await;

    tokio::fs::create_dir_all(&cli.out_dir)
        .await
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let index = cli.out_dir.join("index.html");
    tokio::fs::write(&index, page::render_page(&state))
        .await
        .with_context(|| format!("failed to write {}", index.display()))?;
    tracing::info!("wrote {}", index.display());

    let dashboard = match state {
        PageState::Content(dashboard) => dashboard,
        _ => anyhow::bail!("history could not be rendered, wrote error page"),
    };

    if cli.png {
        let png = chart_image::render_chart_png(&dashboard.chart)?;
        let path = cli.out_dir.join("chart.png");
        tokio::fs::write(&path, png)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("wrote {}", path.display());
    }

    println!(
        "rendered {} (ranking {}, {} chart points)",
        index.display(),
        dashboard.summary.ranking_display,
        dashboard.chart.values.len()
    );

    Ok(())
}
