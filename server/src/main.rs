//! Idle MMO Game Server
//!
//! Runs idle hunting loops and the PvP arena for connected characters,
//! persisting progress to PostgreSQL with an optional Redis snapshot cache.

mod arena;
mod combat;
mod config;
mod entities;
mod equipment;
mod error;
mod hunting;
mod locks;
mod network;
mod persistence;
mod progression;
mod service;
mod session;

use std::sync::Arc;

use log::{error, info};

use crate::config::ServerConfig;
use crate::network::Server;
use crate::persistence::{GameStore, MemoryStore};
use crate::service::GameService;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();

    info!("Starting Idle MMO Server...");
    info!("Hunt interval: {:?}", config.hunt_interval);

    // Initialize persistence (database + cache)
    let store: Arc<dyn GameStore> = match persistence::init(&config.database_url, config.redis_url.as_deref()).await {
        Ok(p) => {
            info!("Persistence layer initialized");
            Arc::new(p)
        }
        Err(e) => {
            error!("Failed to initialize persistence: {}", e);
            error!("Server will run without persistence (demo characters, nothing saved)");
            Arc::new(MemoryStore::with_demo_characters())
        }
    };

    let service = Arc::new(GameService::new(store, config.hunt_interval));

    let server = match Server::new(config.port, Arc::clone(&service), config.session_timeout).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return;
        }
    };

    info!("Server started successfully!");

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Server stopped");
}
