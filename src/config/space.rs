/// Space and room configuration constants.
///
/// Upper limit accepted for a single space dimension, matching the store's
/// `WxH` format of at most four digits per side.
pub const MAX_DIMENSION: i64 = 9999;

/// Spawn policy used when `SPAWN_POLICY` is not set.
pub const DEFAULT_SPAWN_POLICY: &str = "origin";

/// How often (in milliseconds) a room evicts members whose session actor is gone.
pub const STALE_SWEEP_INTERVAL_MS: u64 = 5000;
