use asteroids_server::config::ServerConfig;
use asteroids_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use asteroids_server::ws::{build_router, AppState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid environment: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        tracing::error!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(config.broadcast_capacity);

    let app_state = AppState {
        game_tx,
        broadcast_tx: broadcast_tx.clone(),
        connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
    };

    // Spawn game loop
    tokio::spawn(async move {
        run_game_loop(game_rx, broadcast_tx, config).await;
    });

    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Asteroids server listening on {}", listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
