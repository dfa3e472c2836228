mod bot;
mod config;
mod database;
mod leveling;
mod utils;

use anyhow::Result;
use config::Config;
use leveling::Ledger;
use leveling::cache::LevelCache;
use leveling::clock::{Clock, SystemClock};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "levelbot=info,poise=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let pool = database::create_connection(&config.database_url, config.database_pool_size).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(LevelCache::new(config.leveling.cache_ttl, clock.clone()));
    let ledger = Arc::new(Ledger::new(pool.clone(), cache, clock));

    // Create and start the bot
    let mut client = bot::create_bot(config.clone(), ledger.clone()).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let voice_task = tokio::spawn(bot::voice_task::run_voice_loop(
        bot::voice_task::VoiceTask {
            cache: client.cache.clone(),
            http: client.http.clone(),
            ledger,
            config: config.leveling.clone(),
            level_up_channel_id: config.level_up_channel_id,
        },
        shutdown_rx,
    ));

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown requested");
        shard_manager.shutdown_all().await;
    });

    tracing::info!("Starting Discord bot...");

    if let Err(why) = client.start().await {
        tracing::error!("Client error: {:?}", why);
    }

    // Let an in-flight voice tick finish before the pool goes away.
    let _ = shutdown_tx.send(true);
    if let Err(e) = voice_task.await {
        tracing::error!("Voice XP task failed: {}", e);
    }
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
