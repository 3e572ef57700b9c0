//! Read-only operational endpoints.

use actix_web::{error, http::StatusCode, web, HttpResponse, Error};
use serde::Serialize;

use crate::server::room::messages::{ActiveRooms, ListOccupants};
use crate::server::state::AppState;
use crate::server::ws_error::http_error_response;
use crate::space::types::Occupant;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    rooms: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OccupantList {
    space_id: String,
    users: Vec<Occupant>,
}

pub async fn health(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let rooms = data
        .room_registry
        .send(ActiveRooms)
        .await
        .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(Health { status: "ok", rooms }))
}

pub async fn occupants(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let space_id = path.into_inner();
    let users = data
        .room_registry
        .send(ListOccupants { space_id: space_id.clone() })
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(match users {
        Some(users) => HttpResponse::Ok().json(OccupantList { space_id, users }),
        None => http_error_response(
            "ROOM_NOT_ACTIVE",
            "Nobody is connected to this space.",
            Some(space_id.as_str()),
            StatusCode::NOT_FOUND,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use actix_web::{test, App};
    use std::sync::Arc;

    use crate::auth::JwtVerifier;
    use crate::server::room::RoomRegistry;
    use crate::space::spawn::SpawnPolicy;
    use crate::space::types::Space;
    use crate::store::InMemorySpaceDirectory;
    use crate::test_support::{join, Probe};

    fn app_state(registry: actix::Addr<RoomRegistry>) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            registry,
            Arc::new(JwtVerifier::new(b"secret")),
            Arc::new(InMemorySpaceDirectory::new()),
        ))
    }

    #[actix_web::test]
    async fn health_reports_active_rooms() {
        let registry = RoomRegistry::new(SpawnPolicy::Origin).start();
        let (probe, _rx) = Probe::spawn();
        join(&registry, Space::new("s1", 10, 10), "alice", &probe).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(app_state(registry))
                .configure(crate::server::router::config),
        )
        .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({"status": "ok", "rooms": 1}));
    }

    #[actix_web::test]
    async fn occupants_of_inactive_space_is_not_found() {
        let registry = RoomRegistry::new(SpawnPolicy::Origin).start();
        let app = test::init_service(
            App::new()
                .app_data(app_state(registry))
                .configure(crate::server::router::config),
        )
        .await;
        let req = test::TestRequest::get().uri("/spaces/s1/occupants").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn occupants_lists_users() {
        let registry = RoomRegistry::new(SpawnPolicy::Origin).start();
        let (probe, _rx) = Probe::spawn();
        join(&registry, Space::new("s1", 10, 10), "alice", &probe).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(app_state(registry))
                .configure(crate::server::router::config),
        )
        .await;
        let req = test::TestRequest::get().uri("/spaces/s1/occupants").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            serde_json::json!({"spaceId": "s1", "users": [{"userId": "alice", "x": 0, "y": 0}]})
        );
    }
}
