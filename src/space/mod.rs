//! Space domain: positions, participants, movement rules and per-room state.
//!
//! Nothing in here knows about actors or sockets; the server layer drives it.

pub mod types;
pub mod movement;
pub mod spawn;
pub mod state;
