use actix_web_actors::ws;
use actix::ActorContext;
use log::error;

use crate::server::anti_spam::AntiSpamState;
use crate::server::gateway::messages::ServerEvent;
use crate::server::ws_error::GatewayError;

/// Helpers shared by WebSocket session actors.
pub trait WsActorUtils {
    fn anti_spam(&mut self) -> &mut AntiSpamState;
    fn connection_label(&self) -> String;

    /// Serialize and write one event on this connection.
    fn send_event<A>(&self, ctx: &mut ws::WebsocketContext<A>, event: &ServerEvent)
    where
        A: actix::Actor<Context = ws::WebsocketContext<A>>,
    {
        match serde_json::to_string(event) {
            Ok(text) => ctx.text(text),
            Err(e) => error!("[Gateway] Failed to serialize event for {}: {}", self.connection_label(), e),
        }
    }

    /// Send a recoverable error, unless the same error was just sent.
    fn send_error<A>(&mut self, ctx: &mut ws::WebsocketContext<A>, err: &GatewayError)
    where
        A: actix::Actor<Context = ws::WebsocketContext<A>>,
    {
        let label = self.connection_label();
        if self.anti_spam().should_send_error(err.code(), &label) {
            self.send_event(ctx, &ServerEvent::error(err));
        }
    }

    /// Send the error, close the socket and stop the actor.
    fn send_error_and_close<A>(&mut self, ctx: &mut ws::WebsocketContext<A>, err: &GatewayError)
    where
        A: actix::Actor<Context = ws::WebsocketContext<A>>,
    {
        self.send_event(ctx, &ServerEvent::error(err));
        let code = match err {
            GatewayError::Internal(_) | GatewayError::RoomUnavailable => ws::CloseCode::Error,
            _ => ws::CloseCode::Policy,
        };
        ctx.close(Some(ws::CloseReason {
            code,
            description: Some(err.code().into()),
        }));
        ctx.stop();
    }
}
