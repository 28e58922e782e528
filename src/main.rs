use std::sync::Arc;

use relaycache::cache::ObjectCache;
use relaycache::config::Config;
use relaycache::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let cache = Arc::new(ObjectCache::new(cfg.cache.max_cache_size));
    let listener = server::listener::bind(&cfg).await?;

    tokio::select! {
        res = server::listener::serve(listener, Arc::clone(&cache), cfg.cache.max_object_size) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    cache.teardown().await;
    Ok(())
}
