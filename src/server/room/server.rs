//! Room and registry actors.
//!
//! Each active space is owned by exactly one `Room` actor, which drains admit,
//! move and leave requests one at a time. The `RoomRegistry` only maps space ids
//! to room addresses; it never holds a room's state and never waits on one room
//! while serving another.

use actix::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use log::{debug, error, info, warn};

use super::RoomError;
use super::fanout::Fanout;
use super::messages::{
    ActiveRooms, Admit, AttemptMove, CloseRoom, GetOccupants, JoinSpace, Joined, Leave,
    ListOccupants, RoomIdle,
};
use crate::config::space::STALE_SWEEP_INTERVAL_MS;
use crate::server::gateway::messages::ServerEvent;
use crate::space::spawn::SpawnPolicy;
use crate::space::state::{Admission, MoveOutcome, RoomState};
use crate::space::types::{ConnectionId, Occupant, Space, SpaceId};

/// Live state of one space: members, positions, and how to reach them.
pub struct Room {
    state: RoomState,
    fanout: Fanout,
    spawn_policy: SpawnPolicy,
    registry: Addr<RoomRegistry>,
    sweep_interval: Duration,
    admits_seen: u64,
}

impl Room {
    pub fn new(
        space: Space,
        spawn_policy: SpawnPolicy,
        registry: Addr<RoomRegistry>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            state: RoomState::new(space),
            fanout: Fanout::new(),
            spawn_policy,
            registry,
            sweep_interval,
            admits_seen: 0,
        }
    }

    fn space_id(&self) -> &SpaceId {
        &self.state.space().id
    }

    /// Remove a member and tell the others. No-op for unknown connections.
    fn evict(&mut self, connection_id: &ConnectionId, ctx: &mut Context<Self>) {
        let Some(participant) = self.state.remove(connection_id) else {
            debug!("[Room] Ignoring leave for non-member {} in space {}", connection_id, self.space_id());
            return;
        };
        self.fanout.unsubscribe(connection_id);

        let event = ServerEvent::UserLeft {
            user_id: participant.user_id.clone(),
        };
        self.fanout.broadcast(self.state.connection_ids(), &event, None);
        info!(
            "[Room] User {} ({}) left space {} ({} remaining)",
            participant.user_id,
            participant.connection_id,
            participant.space_id,
            self.state.len()
        );

        if self.state.is_empty() {
            self.registry.do_send(RoomIdle {
                space_id: self.space_id().clone(),
                room: ctx.address(),
                admits_seen: self.admits_seen,
            });
        }
    }

    fn evict_disconnected(&mut self, ctx: &mut Context<Self>) {
        for connection_id in self.fanout.disconnected() {
            warn!("[Room] Evicting unreachable connection {} from space {}", connection_id, self.space_id());
            self.evict(&connection_id, ctx);
        }
    }
}

impl Actor for Room {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("[Room] Opened room for space {}", self.space_id());
        ctx.run_interval(self.sweep_interval, |act, ctx| {
            act.evict_disconnected(ctx);
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("[Room] Closed room for space {}", self.space_id());
    }
}

impl Handler<Admit> for Room {
    type Result = Result<Admission, RoomError>;

    fn handle(&mut self, msg: Admit, _ctx: &mut Context<Self>) -> Self::Result {
        self.admits_seen += 1;
        let admission = self
            .state
            .admit(msg.connection_id, msg.user_id.clone(), self.spawn_policy)?;
        self.fanout.subscribe(msg.connection_id, msg.recipient);

        let event = ServerEvent::UserJoin {
            user_id: msg.user_id.clone(),
            x: admission.spawn.x,
            y: admission.spawn.y,
        };
        let notified = self
            .fanout
            .broadcast(self.state.connection_ids(), &event, Some(&msg.connection_id));
        info!(
            "[Room] User {} joined space {} at ({}, {}), notified {}/{}",
            msg.user_id,
            self.space_id(),
            admission.spawn.x,
            admission.spawn.y,
            notified,
            self.fanout.len() - 1
        );
        Ok(admission)
    }
}

impl Handler<AttemptMove> for Room {
    type Result = Result<MoveOutcome, RoomError>;

    fn handle(&mut self, msg: AttemptMove, _ctx: &mut Context<Self>) -> Self::Result {
        let outcome = self
            .state
            .attempt_move(&msg.connection_id, msg.to)
            .inspect_err(|e| error!("[Room] Space {}: {}", self.state.space().id, e))?;

        match &outcome {
            MoveOutcome::Accepted { user_id, pos } => {
                let event = ServerEvent::Movement {
                    user_id: user_id.clone(),
                    x: pos.x,
                    y: pos.y,
                };
                self.fanout
                    .broadcast(self.state.connection_ids(), &event, Some(&msg.connection_id));
                debug!("[Room] User {} moved to ({}, {}) in space {}", user_id, pos.x, pos.y, self.space_id());
            }
            MoveOutcome::Rejected { pos, reason } => {
                // Only the mover hears about it, in order with its other events.
                self.fanout
                    .send_to(&msg.connection_id, ServerEvent::movement_rejected(*pos));
                debug!(
                    "[Room] Rejected move of {} to ({}, {}): {:?}, staying at ({}, {})",
                    msg.connection_id, msg.to.x, msg.to.y, reason, pos.x, pos.y
                );
            }
        }
        Ok(outcome)
    }
}

impl Handler<Leave> for Room {
    type Result = ();

    fn handle(&mut self, msg: Leave, ctx: &mut Context<Self>) -> Self::Result {
        self.evict(&msg.connection_id, ctx);
    }
}

impl Handler<CloseRoom> for Room {
    type Result = ();

    fn handle(&mut self, _msg: CloseRoom, ctx: &mut Context<Self>) -> Self::Result {
        if self.state.is_empty() && self.fanout.is_empty() {
            ctx.stop();
        } else {
            warn!("[Room] Close requested for non-empty space {}, ignoring", self.space_id());
        }
    }
}

impl Handler<GetOccupants> for Room {
    type Result = MessageResult<GetOccupants>;

    fn handle(&mut self, _msg: GetOccupants, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.state.occupants())
    }
}

struct RoomEntry {
    addr: Addr<Room>,
    // Admissions routed to this room; compared against the room's own count
    // so a room is only discarded when no admission is in flight.
    admits_forwarded: u64,
}

/// Maps space ids to their live room actor.
pub struct RoomRegistry {
    rooms: HashMap<SpaceId, RoomEntry>,
    spawn_policy: SpawnPolicy,
    sweep_interval: Duration,
}

impl RoomRegistry {
    pub fn new(spawn_policy: SpawnPolicy) -> Self {
        Self {
            rooms: HashMap::new(),
            spawn_policy,
            sweep_interval: Duration::from_millis(STALE_SWEEP_INTERVAL_MS),
        }
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}

impl Actor for RoomRegistry {
    type Context = Context<Self>;
}

impl Handler<JoinSpace> for RoomRegistry {
    type Result = ResponseFuture<Result<Joined, RoomError>>;

    fn handle(&mut self, msg: JoinSpace, ctx: &mut Context<Self>) -> Self::Result {
        let registry = ctx.address();
        let (spawn_policy, sweep_interval) = (self.spawn_policy, self.sweep_interval);
        let entry = self.rooms.entry(msg.space.id.clone()).or_insert_with(|| {
            info!("[RoomRegistry] Creating room for space {}", msg.space.id);
            RoomEntry {
                addr: Room::new(msg.space.clone(), spawn_policy, registry, sweep_interval).start(),
                admits_forwarded: 0,
            }
        });
        entry.admits_forwarded += 1;

        let room = entry.addr.clone();
        // Queued now, so the room sees admissions in registry order.
        let request = room.send(Admit {
            connection_id: msg.connection_id,
            user_id: msg.user_id,
            recipient: msg.recipient,
        });

        Box::pin(async move {
            let admission = request.await.map_err(|_| RoomError::Unavailable)??;
            Ok(Joined {
                room,
                spawn: admission.spawn,
                users: admission.others,
            })
        })
    }
}

impl Handler<RoomIdle> for RoomRegistry {
    type Result = ();

    fn handle(&mut self, msg: RoomIdle, _ctx: &mut Context<Self>) -> Self::Result {
        let discard = match self.rooms.get(&msg.space_id) {
            Some(entry) if entry.addr == msg.room => entry.admits_forwarded == msg.admits_seen,
            _ => false,
        };
        if !discard {
            debug!("[RoomRegistry] Keeping room for space {} (admission in flight)", msg.space_id);
            return;
        }
        if let Some(entry) = self.rooms.remove(&msg.space_id) {
            entry.addr.do_send(CloseRoom);
            info!("[RoomRegistry] Discarded empty room for space {}", msg.space_id);
        }
    }
}

impl Handler<ListOccupants> for RoomRegistry {
    type Result = ResponseFuture<Option<Vec<Occupant>>>;

    fn handle(&mut self, msg: ListOccupants, _ctx: &mut Context<Self>) -> Self::Result {
        let request = self
            .rooms
            .get(&msg.space_id)
            .map(|entry| entry.addr.send(GetOccupants));
        Box::pin(async move {
            match request {
                Some(request) => request.await.ok(),
                None => None,
            }
        })
    }
}

impl Handler<ActiveRooms> for RoomRegistry {
    type Result = usize;

    fn handle(&mut self, _msg: ActiveRooms, _ctx: &mut Context<Self>) -> Self::Result {
        self.rooms.len()
    }
}
