//! Configuration Module
//!
//! Property lookup and resolution of the embedded server settings.

mod properties;
mod settings;


// Re-export public types
pub use properties::{FromProperty, Properties};
pub use settings::{resolve_embedded, resolve_port, RedisSettings};

// == Property Keys ==
/// Primary enable flag
pub const EMBEDDED_KEY: &str = "spring.redis.embedded";
/// Enable flag consulted when the primary one is unset
pub const FALLBACK_EMBEDDED_KEY: &str = "system.redis.embedded";
/// Primary port
pub const PORT_KEY: &str = "spring.redis.port";
/// Port consulted when the primary one is unset or zero
pub const FALLBACK_PORT_KEY: &str = "system.redis.port";
/// Path or name of the redis-server binary
pub const EXECUTABLE_KEY: &str = "system.redis.executable";
/// Comma-separated active deployment profiles
pub const ACTIVE_PROFILES_KEY: &str = "spring.profiles.active";

// == Defaults ==
/// Port used when neither port key is set
pub const DEFAULT_PORT: u16 = 6379;
/// Executable used when `system.redis.executable` is unset
pub const DEFAULT_EXECUTABLE: &str = "redis-server";
