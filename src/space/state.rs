use std::collections::HashMap;

use thiserror::Error;

use crate::space::movement::{validate_move, MoveVerdict, RejectReason};
use crate::space::spawn::SpawnPolicy;
use crate::space::types::{ConnectionId, Occupant, Participant, Position, Space, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("connection {0} is already in this room")]
    AlreadyPresent(ConnectionId),
    #[error("connection {0} is not in this room")]
    UnknownConnection(ConnectionId),
}

/// Result of admitting a participant: where they spawned and who else is here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub spawn: Position,
    pub others: Vec<Occupant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted { user_id: UserId, pos: Position },
    /// `pos` is the participant's unchanged, authoritative position.
    Rejected { pos: Position, reason: RejectReason },
}

/// Who is in one space and where. Owned by a single room actor.
#[derive(Debug, Clone)]
pub struct RoomState {
    space: Space,
    participants: HashMap<ConnectionId, Participant>,
}

impl RoomState {
    pub fn new(space: Space) -> Self {
        Self {
            space,
            participants: HashMap::new(),
        }
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.participants.keys()
    }

    pub fn occupants(&self) -> Vec<Occupant> {
        self.participants.values().map(Participant::occupant).collect()
    }

    /// Insert a participant at the policy's spawn point.
    /// The returned snapshot excludes the new participant.
    pub fn admit(
        &mut self,
        connection_id: ConnectionId,
        user_id: UserId,
        policy: SpawnPolicy,
    ) -> Result<Admission, MembershipError> {
        if self.participants.contains_key(&connection_id) {
            return Err(MembershipError::AlreadyPresent(connection_id));
        }

        let others = self.occupants();
        let spawn = policy.spawn_point(&self.space);
        self.participants.insert(
            connection_id,
            Participant {
                connection_id,
                user_id,
                space_id: self.space.id.clone(),
                pos: spawn,
            },
        );

        Ok(Admission { spawn, others })
    }

    /// Validate and, if legal, apply a move.
    pub fn attempt_move(
        &mut self,
        connection_id: &ConnectionId,
        requested: Position,
    ) -> Result<MoveOutcome, MembershipError> {
        let participant = self
            .participants
            .get_mut(connection_id)
            .ok_or(MembershipError::UnknownConnection(*connection_id))?;

        match validate_move(participant.pos, requested, &self.space) {
            MoveVerdict::Accepted => {
                participant.pos = requested;
                Ok(MoveOutcome::Accepted {
                    user_id: participant.user_id.clone(),
                    pos: requested,
                })
            }
            MoveVerdict::Rejected(reason) => Ok(MoveOutcome::Rejected {
                pos: participant.pos,
                reason,
            }),
        }
    }

    /// Remove a participant. Returns `None` if it was not present.
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        self.participants.remove(connection_id)
    }
}
