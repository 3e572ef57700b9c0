//! Connection gateway: one WebSocket actor per client connection, speaking the
//! join/movement protocol and routing requests to the room registry.

pub mod messages;
pub mod session;
