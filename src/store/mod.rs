//! Read access to space records owned by the external store.

pub mod directory;

pub use directory::{InMemorySpaceDirectory, SpaceDirectory};
