//! Identity verification for the join handshake.
//!
//! The gateway only sees the [`IdentityVerifier`] trait; the production
//! implementation checks HS256 JWTs issued by the account service.

pub mod jwt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::space::types::UserId;

pub use jwt::JwtVerifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "user")]
    User,
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Turns an opaque credential into a verified identity.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
