use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

mod actions;
mod checkin;
mod convert;
mod error;
mod leaderboard;
mod model;
mod remote;
mod settlement;
mod store;
mod watcher;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => common::config::Config::load_from(&path)?,
        None => common::config::Config::load()?,
    };

    let dispatch = common::observability::build_dispatch(&config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    tracing::info!(db = %config.spacetime.db_name, "bitcoin blocks game client starting");

    let cancel = CancellationToken::new();
    let store = Arc::new(Mutex::new(store::GameStore::from_config(&config.game)));

    // Connection task plus the inbound frame stream it feeds.
    let (handle, mut frames_rx) = remote::spawn(config.spacetime.clone(), cancel.clone());

    // Frame pump: the single writer to the store.
    let pump_store = Arc::clone(&store);
    let pump = tokio::spawn(async move {
        while let Some(frame) = frames_rx.recv().await {
            pump_store.lock().await.apply(&frame);
        }
        tracing::debug!("frame stream closed");
    });

    let explorer = common::explorer::ExplorerClient::new(
        &config.explorer.api_url,
        config.explorer.max_attempts,
        config.explorer.backoff_base_ms,
        config.explorer.request_timeout_secs,
    )?;
    let watcher = watcher::RoundWatcher::new(
        Arc::clone(&handle) as Arc<dyn remote::Remote>,
        explorer,
        config.game.round_tick_interval_ms,
    );
    let watcher_task = tokio::spawn(watcher.run(Arc::clone(&store), cancel.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    cancel.cancel();

    let _ = watcher_task.await;
    let _ = pump.await;

    Ok(())
}
