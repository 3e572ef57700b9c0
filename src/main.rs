//! Main entry point for the space presence server.
//!
//! Loads configuration, builds the identity verifier and space directory, starts
//! the room registry actor, and launches the HTTP server with the WebSocket
//! endpoint and the operational JSON endpoints.

use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::{info, warn};

use auth::JwtVerifier;
use config::server::ServerConfig;
use server::room::RoomRegistry;
use store::InMemorySpaceDirectory;

pub mod config;
mod auth;
mod server;
mod space;
mod store;

#[cfg(test)]
mod test_support;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; real deployments set the variables directly.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();

    let directory = match &config.spaces_file {
        Some(path) => InMemorySpaceDirectory::from_json_file(path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?,
        None => InMemorySpaceDirectory::new(),
    };
    if directory.is_empty() {
        warn!("[Directory] No spaces loaded (SPACES_FILE unset or empty); every join will fail");
    }
    let verifier = JwtVerifier::new(config.jwt_secret.as_bytes());

    // One registry for the whole process; rooms are spawned on demand.
    let room_registry = RoomRegistry::new(config.spawn_policy).start();

    let state = web::Data::new(server::state::AppState::new(
        room_registry,
        Arc::new(verifier),
        Arc::new(directory),
    ));

    info!(
        "Listening on {}:{} (spawn policy {:?})",
        config.bind_addr, config.port, config.spawn_policy
    );

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
