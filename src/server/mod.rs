// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing and operational endpoints
//! - The connection gateway (one WebSocket actor per client)
//! - The room registry (one actor per active space) and event fanout

pub mod state;
pub mod router;
pub mod status;
pub mod gateway;
pub mod room;
pub mod anti_spam;
pub mod ws_actor_utils;
pub mod ws_error;
