//! Player movement rules.
//!
//! A move is legal when the target lies inside the space (inclusive bounds) and
//! is either the current cell or one orthogonal step away from it.

use crate::space::types::{Position, Space};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutOfBounds,
    NotAdjacent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveVerdict {
    Accepted,
    Rejected(RejectReason),
}

/// Decide whether a participant at `current` may move to `requested`.
pub fn validate_move(current: Position, requested: Position, space: &Space) -> MoveVerdict {
    if !space.contains(requested) {
        return MoveVerdict::Rejected(RejectReason::OutOfBounds);
    }

    // Both points are inside the space here, so the differences cannot overflow.
    let dx = (requested.x - current.x).abs();
    let dy = (requested.y - current.y).abs();
    match (dx, dy) {
        (0, 0) | (1, 0) | (0, 1) => MoveVerdict::Accepted,
        _ => MoveVerdict::Rejected(RejectReason::NotAdjacent),
    }
}
