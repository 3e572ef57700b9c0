// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the room registry address and the two external collaborators
//! (identity verification and the space directory), shared by all handlers.

use actix::Addr;
use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::server::room::RoomRegistry;
use crate::store::SpaceDirectory;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the room registry actor (routes joins, tracks active rooms).
    pub room_registry: Addr<RoomRegistry>,
    /// Turns join tokens into identities.
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Resolves space ids to their bounds.
    pub directory: Arc<dyn SpaceDirectory>,
}

impl AppState {
    pub fn new(
        room_registry: Addr<RoomRegistry>,
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn SpaceDirectory>,
    ) -> Self {
        AppState {
            room_registry,
            verifier,
            directory,
        }
    }
}
