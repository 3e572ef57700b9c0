//! HTTP and WebSocket routing configuration.
//!
//! The WebSocket endpoint is served on both `/` and `/ws`; the two small JSON
//! endpoints expose room activity for operators.

use actix_web::web;
use crate::server::gateway::session::ws_space;
use crate::server::status::{health, occupants};

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_space))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/spaces/{space_id}/occupants").route(web::get().to(occupants)))
        .service(web::resource("/").to(ws_space));
}
