use rank_tracker::config::SiteConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("serve=info,rank_tracker=debug,tower_http=debug")),
        )
        .init();

    let mut site = SiteConfig::from_env();
    if let Some(dir) = std::env::args().nth(1) {
        site.site_dir = dir.into();
    }

    rank_tracker::run(site).await
}
