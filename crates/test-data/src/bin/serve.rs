//! Mock backend serving a generated training history.
//!
//! Run with:
//! ```
//! PORT=3000 SEED=7 DASHBOARD_TOKEN=dev cargo run -p test-data --bin serve
//! ```

use dashboard::week_range::today;
use test_data::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    let seed = std::env::var("SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| SeedConfig::default().seed);

    let token = std::env::var("DASHBOARD_TOKEN").unwrap_or_else(|_| "dev".to_string());

    let dataset = DatasetBuilder::new().with_seed(seed).build(today());

    tracing::info!("Seed {seed}, token {token:?}");

    run_server(MockState { dataset, token }, port).await
}
