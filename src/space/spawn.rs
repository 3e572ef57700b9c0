//! Spawn point selection for participants entering a room.

use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

use crate::space::types::{Position, Space};

/// Where a newly admitted participant appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnPolicy {
    /// Always `(0, 0)`.
    #[default]
    Origin,
    /// `(width / 2, height / 2)`.
    Center,
    /// Uniformly random cell inside the inclusive bounds.
    Random,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown spawn policy '{0}'")]
pub struct UnknownSpawnPolicy(pub String);

impl FromStr for SpawnPolicy {
    type Err = UnknownSpawnPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "origin" => Ok(SpawnPolicy::Origin),
            "center" | "centre" => Ok(SpawnPolicy::Center),
            "random" => Ok(SpawnPolicy::Random),
            other => Err(UnknownSpawnPolicy(other.to_string())),
        }
    }
}

impl SpawnPolicy {
    pub fn spawn_point(self, space: &Space) -> Position {
        match self {
            SpawnPolicy::Origin => Position::ORIGIN,
            SpawnPolicy::Center => Position::new(space.width / 2, space.height / 2),
            SpawnPolicy::Random => {
                let mut rng = rand::rng();
                Position::new(
                    rng.random_range(0..=space.width.max(0)),
                    rng.random_range(0..=space.height.max(0)),
                )
            }
        }
    }
}
