use actix::prelude::*;

use super::RoomError;
use super::server::Room;
use crate::server::gateway::messages::ServerEvent;
use crate::space::state::{Admission, MoveOutcome};
use crate::space::types::{ConnectionId, Occupant, Position, Space, SpaceId, UserId};

/// Gateway -> registry: admit a connection into the room for `space`,
/// creating the room if needed.
#[derive(Message)]
#[rtype(result = "Result<Joined, RoomError>")]
pub struct JoinSpace {
    pub space: Space,
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub recipient: Recipient<ServerEvent>,
}

/// Reply to [`JoinSpace`]: the room to talk to from now on, the spawn, and
/// everybody else already present.
pub struct Joined {
    pub room: Addr<Room>,
    pub spawn: Position,
    pub users: Vec<Occupant>,
}

/// Registry -> room.
#[derive(Message)]
#[rtype(result = "Result<Admission, RoomError>")]
pub struct Admit {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub recipient: Recipient<ServerEvent>,
}

/// Gateway -> room.
#[derive(Message)]
#[rtype(result = "Result<MoveOutcome, RoomError>")]
pub struct AttemptMove {
    pub connection_id: ConnectionId,
    pub to: Position,
}

/// Gateway -> room. Idempotent.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub connection_id: ConnectionId,
}

/// Room -> registry: the room just became empty after `admits_seen` admissions.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RoomIdle {
    pub space_id: SpaceId,
    pub room: Addr<Room>,
    pub admits_seen: u64,
}

/// Registry -> room: stop if still empty.
#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseRoom;

/// Current occupants of one room.
#[derive(Message)]
#[rtype(result = "Vec<Occupant>")]
pub struct GetOccupants;

/// Occupants of the room for `space_id`, or `None` if no room is active.
#[derive(Message)]
#[rtype(result = "Option<Vec<Occupant>>")]
pub struct ListOccupants {
    pub space_id: SpaceId,
}

/// Number of active rooms.
#[derive(Message)]
#[rtype(result = "usize")]
pub struct ActiveRooms;
