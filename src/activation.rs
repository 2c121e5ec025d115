//! Activation Gate
//!
//! Decides whether the hosting process should construct the embedded server
//! lifecycle at all. The gate is evaluated before construction; the lifecycle
//! itself only re-checks the finer-grained enable flag.

use tracing::debug;

use crate::config::{Properties, ACTIVE_PROFILES_KEY, FALLBACK_EMBEDDED_KEY};

/// Profile that never runs an embedded server
pub const PRODUCTION_PROFILE: &str = "production";

/// Returns the active deployment profiles, in declaration order.
pub fn active_profiles(properties: &Properties) -> Vec<String> {
    properties
        .raw(ACTIVE_PROFILES_KEY)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|profile| !profile.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Returns true if the embedded server lifecycle should be constructed.
///
/// Requires that the `production` profile (matched exactly) is not active and that
/// `system.redis.embedded` is literally `true` (case-insensitive).
pub fn is_activated(properties: &Properties) -> bool {
    let profiles = active_profiles(properties);
    if profiles.iter().any(|profile| profile == PRODUCTION_PROFILE) {
        debug!(?profiles, "Embedded redis disabled by production profile");
        return false;
    }

    let requested = properties
        .raw(FALLBACK_EMBEDDED_KEY)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
    if !requested {
        debug!("Embedded redis not requested via {}", FALLBACK_EMBEDDED_KEY);
    }
    requested
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_profiles_parsing() {
        let props = Properties::new().with("spring.profiles.active", " dev, ,local ");
        assert_eq!(active_profiles(&props), vec!["dev", "local"]);
        assert!(active_profiles(&Properties::new()).is_empty());
    }

    #[test]
    fn test_activated_outside_production() {
        let props = Properties::new()
            .with("spring.profiles.active", "dev")
            .with("system.redis.embedded", "true");
        assert!(is_activated(&props));

        let props = Properties::new().with("system.redis.embedded", "TRUE");
        assert!(is_activated(&props));
    }

    #[test]
    fn test_production_profile_blocks_activation() {
        let props = Properties::new()
            .with("spring.profiles.active", "dev,production")
            .with("system.redis.embedded", "true");
        assert!(!is_activated(&props));
    }

    #[test]
    fn test_profile_match_is_case_sensitive() {
        let props = Properties::new()
            .with("spring.profiles.active", "Production")
            .with("system.redis.embedded", "true");
        assert!(is_activated(&props));

        let props = Properties::new()
            .with("spring.profiles.active", "PRODUCTION, production")
            .with("system.redis.embedded", "true");
        assert!(!is_activated(&props));
    }

    #[test]
    fn test_property_gate_requires_literal_true() {
        assert!(!is_activated(&Properties::new()));

        let props = Properties::new().with("system.redis.embedded", "false");
        assert!(!is_activated(&props));

        // The gate matches the literal value, unlike the lenient flag converter
        let props = Properties::new().with("system.redis.embedded", "yes");
        assert!(!is_activated(&props));

        // The primary key alone does not satisfy the gate
        let props = Properties::new().with("spring.redis.embedded", "true");
        assert!(!is_activated(&props));
    }
}
