/// Main configuration module.
///
/// Compile-time constants live in `anti_spam` and `space`; runtime settings
/// read from the environment live in `server`.
pub mod anti_spam;
pub mod space;
pub mod server;
