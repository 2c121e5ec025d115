//! Embedded Server Settings
//!
//! Resolves the enable flag, port and executable of the embedded server from
//! a [`Properties`] snapshot.

use std::path::PathBuf;

use crate::config::{
    Properties, DEFAULT_EXECUTABLE, DEFAULT_PORT, EMBEDDED_KEY, EXECUTABLE_KEY, FALLBACK_EMBEDDED_KEY,
    FALLBACK_PORT_KEY, PORT_KEY,
};

// == Port Resolution ==
/// Resolves the embedded server port.
///
/// `spring.redis.port` wins unless it is absent or `0`, in which case
/// `system.redis.port` is used, defaulting to 6379.
pub fn resolve_port(properties: &Properties) -> u16 {
    match properties.get_or(PORT_KEY, 0u16) {
        0 => properties.get_or(FALLBACK_PORT_KEY, DEFAULT_PORT),
        port => port,
    }
}

// == Enable Flag Resolution ==
/// Resolves whether the embedded server should run.
///
/// An explicit `spring.redis.embedded=false` is a value and wins; only an
/// unset primary key falls through to `system.redis.embedded`.
pub fn resolve_embedded(properties: &Properties) -> bool {
    properties
        .get::<bool>(EMBEDDED_KEY)
        .unwrap_or_else(|| properties.get_or(FALLBACK_EMBEDDED_KEY, false))
}

// == Settings Snapshot ==
/// Resolved configuration of the embedded server, captured once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Whether the embedded server should be started
    pub embedded: bool,
    /// Port the server binds to
    pub port: u16,
    /// Server executable, looked up on `PATH` when relative
    pub executable: PathBuf,
}

impl RedisSettings {
    /// Resolves all settings from the given properties.
    pub fn resolve(properties: &Properties) -> Self {
        Self {
            embedded: resolve_embedded(properties),
            port: resolve_port(properties),
            executable: properties.get_or(EXECUTABLE_KEY, PathBuf::from(DEFAULT_EXECUTABLE)),
        }
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            embedded: false,
            port: DEFAULT_PORT,
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = RedisSettings::default();
        assert!(!settings.embedded);
        assert_eq!(settings.port, 6379);
        assert_eq!(settings.executable, PathBuf::from("redis-server"));
        assert_eq!(RedisSettings::resolve(&Properties::new()), settings);
    }

    #[test]
    fn test_port_primary_wins() {
        let props = Properties::new()
            .with("spring.redis.port", "6380")
            .with("system.redis.port", "6390");
        assert_eq!(resolve_port(&props), 6380);
    }

    #[test]
    fn test_port_zero_falls_back() {
        let props = Properties::new()
            .with("spring.redis.port", "0")
            .with("system.redis.port", "6390");
        assert_eq!(resolve_port(&props), 6390);

        let props = Properties::new().with("system.redis.port", "6391");
        assert_eq!(resolve_port(&props), 6391);
    }

    #[test]
    fn test_port_default() {
        assert_eq!(resolve_port(&Properties::new()), 6379);

        let props = Properties::new().with("spring.redis.port", "0");
        assert_eq!(resolve_port(&props), 6379);
    }

    #[test]
    fn test_embedded_explicit_false_does_not_fall_back() {
        let props = Properties::new()
            .with("spring.redis.embedded", "false")
            .with("system.redis.embedded", "true");
        assert!(!resolve_embedded(&props));
    }

    #[test]
    fn test_embedded_precedence() {
        let props = Properties::new()
            .with("spring.redis.embedded", "true")
            .with("system.redis.embedded", "false");
        assert!(resolve_embedded(&props));

        let props = Properties::new().with("system.redis.embedded", "true");
        assert!(resolve_embedded(&props));

        assert!(!resolve_embedded(&Properties::new()));
    }

    #[test]
    fn test_executable_override() {
        let props = Properties::new().with("system.redis.executable", "/opt/redis/bin/redis-server");
        let settings = RedisSettings::resolve(&props);
        assert_eq!(
            settings.executable,
            PathBuf::from("/opt/redis/bin/redis-server")
        );
    }
}
