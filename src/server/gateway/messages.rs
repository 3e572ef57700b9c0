use actix::prelude::*;
use serde::{Deserialize, Serialize};

use crate::server::ws_error::GatewayError;
use crate::space::types::{Occupant, Position, SpaceId, UserId};

// Client -> server. Envelope: {"type": ..., "payload": {...}}
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Join { space_id: SpaceId, token: String },
    #[serde(alias = "move")]
    Movement { x: i64, y: i64 },
}

// Server -> client
#[derive(Message, Serialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    SpaceJoined {
        user_id: UserId,
        spawn: Position,
        users: Vec<Occupant>,
    },
    #[serde(rename_all = "camelCase")]
    UserJoin { user_id: UserId, x: i64, y: i64 },
    #[serde(rename_all = "camelCase")]
    Movement { user_id: UserId, x: i64, y: i64 },
    MovementRejected { x: i64, y: i64 },
    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: UserId },
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(err: &GatewayError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn movement_rejected(pos: Position) -> Self {
        Self::MovementRejected { x: pos.x, y: pos.y }
    }
}
