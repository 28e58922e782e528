use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, Instrument};

use crate::cache::ObjectCache;
use crate::config::Config;
use crate::http::connection::Connection;

pub async fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    Ok(listener)
}

/// Accepts connections forever, one task per connection.
///
/// Nothing that happens inside a connection task, panics included, reaches
/// this loop.
pub async fn serve(
    listener: TcpListener,
    cache: Arc<ObjectCache>,
    max_object_size: usize,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Accept failed: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let cache = Arc::clone(&cache);
        let span = tracing::info_span!("conn", %peer);
        let task = tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, cache, max_object_size);
                if let Err(e) = conn.run().await {
                    tracing::warn!("Connection error: {:#}", e);
                }
            }
            .instrument(span),
        );

        tokio::spawn(async move {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!("Connection task from {} panicked", peer);
                }
            }
        });
    }
}
