//! Centralized error taxonomy for the gateway, plus the HTTP error helper.
//!
//! Every error has a stable code (e.g. "SPACE_NOT_FOUND") sent to the client
//! alongside a human-readable message.

use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

use crate::auth::AuthError;
use crate::server::room::RoomError;
use crate::space::state::MembershipError;
use crate::space::types::SpaceId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("space '{0}' not found")]
    SpaceNotFound(SpaceId),
    #[error("this connection has already joined a space")]
    AlreadyJoined,
    #[error("join a space before sending movement")]
    NotJoined,
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("room is unavailable")]
    RoomUnavailable,
    #[error("internal error: {0}")]
    Internal(String),
    #[error("too many requests, retry in {0}s")]
    RateLimited(u64),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Authentication(_) => "AUTHENTICATION_FAILED",
            GatewayError::SpaceNotFound(_) => "SPACE_NOT_FOUND",
            GatewayError::AlreadyJoined => "ALREADY_JOINED",
            GatewayError::NotJoined => "NOT_JOINED",
            GatewayError::InvalidMessage(_) => "INVALID_MESSAGE",
            GatewayError::RoomUnavailable => "ROOM_UNAVAILABLE",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
            GatewayError::RateLimited(_) => "RATE_LIMITED",
        }
    }

    /// Fatal errors close the connection after the error event is sent.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            GatewayError::AlreadyJoined | GatewayError::NotJoined | GatewayError::InvalidMessage(_)
        )
    }
}

impl From<RoomError> for GatewayError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::Unavailable => GatewayError::RoomUnavailable,
            RoomError::Membership(MembershipError::AlreadyPresent(id)) => {
                GatewayError::Internal(format!("connection {} admitted twice", id))
            }
            RoomError::Membership(MembershipError::UnknownConnection(id)) => {
                GatewayError::Internal(format!("connection {} is not a room member", id))
            }
        }
    }
}

/// Returns an HTTP error response with a JSON body.
///
/// # Arguments
/// - `code`: Unique error code.
/// - `message`: Human-readable error message.
/// - `context`: Optional context string.
/// - `status`: HTTP status code.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    }))
}
