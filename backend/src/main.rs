use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use backend::config::Config;
use backend::services::economy::EconomyEngine;
use backend::{app, logging, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_path(".env").ok();
    logging::setup();

    let config = Config::from_env()?;
    let store = config.build_store()?;
    let economy = Arc::new(EconomyEngine::new(store, config.initial_balances));

    economy.load().await;

    let state = AppState::new(Arc::clone(&economy), config.build_reward_provider(), config.spin_duration);

    info!("listening on {}", config.bind);
    let listener = TcpListener::bind(config.bind).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = economy.flush().await {
        error!("Failed to flush balances on shutdown: {}", e);
    }
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
