//! Room registry: one actor per active space, plus the registry actor that
//! creates and discards them.

pub mod fanout;
pub mod messages;
pub mod server;

use thiserror::Error;

use crate::space::state::MembershipError;

pub use server::{Room, RoomRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room actor is unavailable")]
    Unavailable,
    #[error(transparent)]
    Membership(#[from] MembershipError),
}
