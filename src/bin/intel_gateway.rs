//! Intel gateway service binary.
//!
//! Loads the configuration (file, then environment overrides), wires the
//! search, scrape, LLM and price collaborators into a pipeline, and serves
//! the HTTP API until interrupted. Logs go to stderr.

use std::sync::Arc;

use intel_gateway::config::GatewayConfig;
use intel_gateway::{
    ActivityLog, AppState, ChatCompletionsClient, CoinGeckoClient, GatewayServer, Pipeline,
};
use intel_search::{BlockingPool, HttpPageFetcher, MultiSourceSearcher, PageFetcher, ParallelScraper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = GatewayConfig::default_config_path();
    let config = GatewayConfig::load(&path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    tracing::info!(config = %path.display(), model = %config.llm.model, "intel-gateway starting");

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(&config.search));
    let pool = BlockingPool::new(config.search.scrape_workers);
    let searcher = MultiSourceSearcher::from_config(Arc::clone(&fetcher), pool.clone(), &config.search)?;
    let scraper = ParallelScraper::new(fetcher, pool, &config.search);

    let llm = Arc::new(ChatCompletionsClient::new(&config.llm)?);
    let prices = Arc::new(CoinGeckoClient::new(&config.price)?);
    let pipeline = Arc::new(Pipeline::new(searcher, scraper, llm, prices));
    let activity = Arc::new(ActivityLog::new(config.activity.capacity));

    let state = AppState::new(pipeline, activity, &config)?;
    let server = GatewayServer::start(state, &config.server).await?;
    tracing::info!(addr = %server.addr(), "ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();
    Ok(())
}
