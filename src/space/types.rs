use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user, as carried in the verified token.
pub type UserId = String;

/// Identifier of a space, as known to the external store.
pub type SpaceId = String;

/// Server-assigned identifier of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A space as seen by the real-time core: an id and its inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub width: i64,
    pub height: i64,
}

impl Space {
    pub fn new(id: impl Into<SpaceId>, width: i64, height: i64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// Inclusive on both ends: `x == width` and `y == height` are inside.
    pub fn contains(&self, pos: Position) -> bool {
        (0..=self.width).contains(&pos.x) && (0..=self.height).contains(&pos.y)
    }
}

/// One joined connection's live presence in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub space_id: SpaceId,
    pub pos: Position,
}

impl Participant {
    pub fn occupant(&self) -> Occupant {
        Occupant {
            user_id: self.user_id.clone(),
            x: self.pos.x,
            y: self.pos.y,
        }
    }
}

/// Public view of a participant, as sent to other clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupant {
    pub user_id: UserId,
    pub x: i64,
    pub y: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let space = Space::new("s", 100, 200);
        assert!(space.contains(Position::new(0, 0)));
        assert!(space.contains(Position::new(100, 200)));
        assert!(!space.contains(Position::new(101, 200)));
        assert!(!space.contains(Position::new(100, 201)));
        assert!(!space.contains(Position::new(-1, 0)));
    }

    #[test]
    fn occupant_serializes_camel_case() {
        let occupant = Occupant { user_id: "u1".into(), x: 3, y: 4 };
        let json = serde_json::to_value(&occupant).unwrap();
        assert_eq!(json, serde_json::json!({"userId": "u1", "x": 3, "y": 4}));
    }

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
