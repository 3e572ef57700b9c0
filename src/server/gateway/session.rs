//! WebSocket session handler for a shared space.
//!
//! One actor per connection. It walks the connection through
//! `Unauthenticated -> Joined -> Closed`, verifies the join handshake, forwards
//! movement to the room, and writes room events to the socket.

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::sync::Arc;
use log::{debug, error, info, warn};

use super::messages::{ClientMessage, ServerEvent};
use crate::auth::{Identity, IdentityVerifier};
use crate::server::anti_spam::AntiSpamState;
use crate::server::room::messages::{AttemptMove, JoinSpace, Leave};
use crate::server::room::{Room, RoomRegistry};
use crate::server::state::AppState;
use crate::server::ws_actor_utils::WsActorUtils;
use crate::server::ws_error::GatewayError;
use crate::space::state::MoveOutcome;
use crate::space::types::{ConnectionId, Position, Space, SpaceId, UserId};
use crate::store::SpaceDirectory;

/// The room a joined connection belongs to.
pub struct Membership {
    pub user_id: UserId,
    pub space_id: SpaceId,
    pub room: Addr<Room>,
}

pub enum ConnectionState {
    Unauthenticated,
    /// Credentials checked, waiting for the registry to admit us.
    Joining,
    Joined(Membership),
    Closed,
}

/// Check the join credentials and resolve the target space.
pub fn authorize_join(
    verifier: &dyn IdentityVerifier,
    directory: &dyn SpaceDirectory,
    space_id: &str,
    token: &str,
) -> Result<(Identity, Space), GatewayError> {
    let identity = verifier.verify(token)?;
    let space = directory
        .get_space(space_id)
        .ok_or_else(|| GatewayError::SpaceNotFound(space_id.to_string()))?;
    Ok((identity, space))
}

pub struct SpaceSession {
    connection_id: ConnectionId,
    state: ConnectionState,
    registry: Addr<RoomRegistry>,
    verifier: Arc<dyn IdentityVerifier>,
    directory: Arc<dyn SpaceDirectory>,
    anti_spam: AntiSpamState,
}

impl SpaceSession {
    pub fn new(
        registry: Addr<RoomRegistry>,
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn SpaceDirectory>,
    ) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            state: ConnectionState::Unauthenticated,
            registry,
            verifier,
            directory,
            anti_spam: AntiSpamState::new(),
        }
    }

    fn handle_join(&mut self, space_id: SpaceId, token: String, ctx: &mut ws::WebsocketContext<Self>) {
        match self.state {
            ConnectionState::Unauthenticated => {}
            ConnectionState::Closed => return,
            ConnectionState::Joining | ConnectionState::Joined(_) => {
                self.report(ctx, &GatewayError::AlreadyJoined);
                return;
            }
        }

        let (identity, space) = match authorize_join(
            self.verifier.as_ref(),
            self.directory.as_ref(),
            &space_id,
            &token,
        ) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("[Gateway] Join refused for connection {}: {}", self.connection_id, e);
                self.report(ctx, &e);
                return;
            }
        };

        self.state = ConnectionState::Joining;
        let Identity { user_id, role } = identity;
        let request = JoinSpace {
            space,
            connection_id: self.connection_id,
            user_id: user_id.clone(),
            recipient: ctx.address().recipient(),
        };

        // `wait` pauses the socket stream and the mailbox until the registry
        // answers, so room events queue behind `space-joined` and the
        // connection cannot stop before it is recorded as joined.
        self.registry
            .send(request)
            .into_actor(self)
            .then(move |res, act, ctx| {
                match res {
                    Ok(Ok(joined)) => {
                        info!(
                            "[Gateway] Connection {} joined space {} as {} ({:?})",
                            act.connection_id, space_id, user_id, role
                        );
                        act.anti_spam.reset_on_valid_action();
                        act.send_event(
                            ctx,
                            &ServerEvent::SpaceJoined {
                                user_id: user_id.clone(),
                                spawn: joined.spawn,
                                users: joined.users,
                            },
                        );
                        act.state = ConnectionState::Joined(Membership {
                            user_id,
                            space_id,
                            room: joined.room,
                        });
                    }
                    Ok(Err(e)) => {
                        error!("[Gateway] Registry refused connection {}: {}", act.connection_id, e);
                        act.report(ctx, &e.into());
                    }
                    Err(e) => {
                        error!("[Gateway] Registry unreachable for connection {}: {}", act.connection_id, e);
                        act.report(ctx, &GatewayError::RoomUnavailable);
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn handle_movement(&mut self, to: Position, ctx: &mut ws::WebsocketContext<Self>) {
        let room = match &self.state {
            ConnectionState::Joined(membership) => membership.room.clone(),
            ConnectionState::Closed => return,
            _ => {
                self.report(ctx, &GatewayError::NotJoined);
                return;
            }
        };

        room.send(AttemptMove {
            connection_id: self.connection_id,
            to,
        })
        .into_actor(self)
        .then(|res, act, ctx| {
            match res {
                Ok(Ok(MoveOutcome::Accepted { .. })) => act.anti_spam.reset_on_valid_action(),
                // The room already queued `movement-rejected` on our mailbox,
                // behind anything it broadcast to us earlier.
                Ok(Ok(MoveOutcome::Rejected { .. })) => {}
                Ok(Err(e)) => {
                    // The room does not know this connection although we think we joined it.
                    error!("[Gateway] Inconsistent membership for connection {}: {}", act.connection_id, e);
                    act.report(ctx, &e.into());
                }
                Err(e) => {
                    error!("[Gateway] Room unreachable for connection {}: {}", act.connection_id, e);
                    act.report(ctx, &GatewayError::RoomUnavailable);
                }
            }
            fut::ready(())
        })
        .wait(ctx);
    }

    /// Send `err` to the client. Fatal errors also close the socket and
    /// release room membership; the rest leave the connection as it was.
    fn report(&mut self, ctx: &mut ws::WebsocketContext<Self>, err: &GatewayError) {
        if err.is_fatal() {
            self.send_error_and_close(ctx, err);
            self.leave_room();
        } else {
            self.send_error(ctx, err);
        }
    }

    /// Leave the room (at most once) and mark the connection closed.
    fn leave_room(&mut self) {
        let previous = std::mem::replace(&mut self.state, ConnectionState::Closed);
        if let ConnectionState::Joined(membership) = previous {
            membership.room.do_send(Leave {
                connection_id: self.connection_id,
            });
            info!(
                "[Gateway] Connection {} ({}) left space {}",
                self.connection_id, membership.user_id, membership.space_id
            );
        }
    }
}

impl WsActorUtils for SpaceSession {
    fn anti_spam(&mut self) -> &mut AntiSpamState {
        &mut self.anti_spam
    }

    fn connection_label(&self) -> String {
        self.connection_id.to_string()
    }
}

impl Actor for SpaceSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Gateway] Connection {} opened", self.connection_id);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.leave_room();
        info!("[Gateway] Connection {} closed", self.connection_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for SpaceSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("[Gateway] Protocol error on connection {}: {}", self.connection_id, e);
                ctx.stop();
                return;
            }
        };

        match msg {
            ws::Message::Text(text) => {
                if matches!(self.state, ConnectionState::Closed) {
                    return;
                }
                let label = self.connection_label();
                if self.anti_spam.record_request(&label) {
                    let retry_in = self.anti_spam.ban_remaining_secs();
                    self.report(ctx, &GatewayError::RateLimited(retry_in));
                    return;
                }
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join { space_id, token }) => {
                        debug!("[Gateway] Join request from {} for space {}", self.connection_id, space_id);
                        self.handle_join(space_id, token, ctx);
                    }
                    Ok(ClientMessage::Movement { x, y }) => {
                        self.handle_movement(Position::new(x, y), ctx);
                    }
                    Err(e) => {
                        debug!("[Gateway] Invalid message from {}: {}", self.connection_id, e);
                        self.report(ctx, &GatewayError::InvalidMessage(e.to_string()));
                    }
                }
            }
            ws::Message::Binary(_) => {
                self.report(
                    ctx,
                    &GatewayError::InvalidMessage("binary frames are not supported".to_string()),
                );
            }
            ws::Message::Ping(bytes) => ctx.pong(&bytes),
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerEvent> for SpaceSession {
    type Result = ();

    /// Room events for this connection.
    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        if matches!(self.state, ConnectionState::Closed) {
            return;
        }
        self.send_event(ctx, &msg);
    }
}

/// WebSocket endpoint for shared spaces. The join handshake happens in-band.
pub async fn ws_space(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(
        SpaceSession::new(
            data.room_registry.clone(),
            data.verifier.clone(),
            data.directory.clone(),
        ),
        &req,
        stream,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, Role};
    use crate::store::InMemorySpaceDirectory;
    use crate::store::directory::SpaceRecord;

    struct FixedVerifier;

    impl IdentityVerifier for FixedVerifier {
        fn verify(&self, token: &str) -> Result<Identity, AuthError> {
            match token {
                "good" => Ok(Identity { user_id: "alice".into(), role: Role::User }),
                _ => Err(AuthError::InvalidToken("unknown".into())),
            }
        }
    }

    fn directory() -> InMemorySpaceDirectory {
        let directory = InMemorySpaceDirectory::new();
        directory
            .insert(SpaceRecord {
                id: "space-1".into(),
                name: None,
                dimensions: Some("100x200".into()),
                width: None,
                height: None,
            })
            .unwrap();
        directory
    }

    #[test]
    fn valid_join_resolves_identity_and_space() {
        let (identity, space) = authorize_join(&FixedVerifier, &directory(), "space-1", "good").unwrap();
        assert_eq!(identity.user_id, "alice");
        assert_eq!(space, Space::new("space-1", 100, 200));
    }

    #[test]
    fn bad_token_is_an_authentication_failure() {
        let err = authorize_join(&FixedVerifier, &directory(), "space-1", "bad").unwrap_err();
        assert_eq!(err.code(), "AUTHENTICATION_FAILED");
        assert!(err.is_fatal());
    }

    #[test]
    fn authentication_is_checked_before_the_space() {
        let err = authorize_join(&FixedVerifier, &directory(), "nowhere", "bad").unwrap_err();
        assert_eq!(err.code(), "AUTHENTICATION_FAILED");
    }

    #[test]
    fn unknown_space_is_fatal() {
        let err = authorize_join(&FixedVerifier, &directory(), "nowhere", "good").unwrap_err();
        assert_eq!(err, GatewayError::SpaceNotFound("nowhere".into()));
        assert!(err.is_fatal());
    }
}
