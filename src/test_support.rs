//! Test doubles for actor-level tests: a probe connection that records the
//! events a room delivers to it.

use actix::prelude::*;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

use crate::server::gateway::messages::ServerEvent;
use crate::server::room::messages::{JoinSpace, Joined};
use crate::server::room::{RoomError, RoomRegistry};
use crate::space::types::{ConnectionId, Space};

pub struct Probe {
    tx: UnboundedSender<ServerEvent>,
}

impl Actor for Probe {
    type Context = Context<Self>;
}

impl Handler<ServerEvent> for Probe {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, _ctx: &mut Context<Self>) {
        let _ = self.tx.send(msg);
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct StopProbe;

impl Handler<StopProbe> for Probe {
    type Result = ();

    fn handle(&mut self, _msg: StopProbe, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}

/// A fake connection: its id and the actor standing in for its session.
pub struct ProbeHandle {
    pub probe: Addr<Probe>,
    pub connection_id: ConnectionId,
}

pub struct Events(UnboundedReceiver<ServerEvent>);

impl Events {
    /// Next delivered event, or `None` after one second of silence.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        timeout(Duration::from_secs(1), self.0.recv()).await.ok().flatten()
    }

    pub async fn assert_silent(&mut self) {
        if let Ok(Some(event)) = timeout(Duration::from_millis(50), self.0.recv()).await {
            panic!("unexpected event: {:?}", event);
        }
    }
}

impl Probe {
    pub fn spawn() -> (ProbeHandle, Events) {
        let (tx, rx) = unbounded_channel();
        let probe = Probe { tx }.start();
        (
            ProbeHandle {
                probe,
                connection_id: ConnectionId::new(),
            },
            Events(rx),
        )
    }
}

pub async fn join(
    registry: &Addr<RoomRegistry>,
    space: Space,
    user_id: &str,
    handle: &ProbeHandle,
) -> Result<Joined, RoomError> {
    registry
        .send(JoinSpace {
            space,
            connection_id: handle.connection_id,
            user_id: user_id.to_string(),
            recipient: handle.probe.clone().recipient(),
        })
        .await
        .map_err(|_| RoomError::Unavailable)?
}
