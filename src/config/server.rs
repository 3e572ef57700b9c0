//! Runtime server settings read from the environment.
//!
//! `main` loads a `.env` file first (if any), then calls [`ServerConfig::from_env`].

use std::path::PathBuf;

use log::warn;

use crate::config::space::DEFAULT_SPAWN_POLICY;
use crate::space::spawn::SpawnPolicy;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;

/// Settings for the HTTP/WebSocket server and its collaborators.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface the server binds to (`BIND_ADDR`).
    pub bind_addr: String,
    /// TCP port (`PORT`).
    pub port: u16,
    /// HMAC secret used to verify bearer tokens (`JWT_SECRET`).
    pub jwt_secret: String,
    /// Optional JSON file used to seed the space directory (`SPACES_FILE`).
    pub spaces_file: Option<PathBuf>,
    /// Where new participants appear in a room (`SPAWN_POLICY`).
    pub spawn_policy: SpawnPolicy,
}

impl ServerConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!("[Config] Invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() {
            warn!("[Config] JWT_SECRET is empty; tokens signed with an empty key will be accepted");
        }

        let spaces_file = lookup("SPACES_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let raw_policy = lookup("SPAWN_POLICY").unwrap_or_else(|| DEFAULT_SPAWN_POLICY.to_string());
        let spawn_policy = raw_policy.parse::<SpawnPolicy>().unwrap_or_else(|_| {
            warn!("[Config] Unknown SPAWN_POLICY '{}', using origin", raw_policy);
            SpawnPolicy::Origin
        });

        Self {
            bind_addr,
            port,
            jwt_secret,
            spaces_file,
            spawn_policy,
        }
    }
}
