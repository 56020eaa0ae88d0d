use crate::error::ConfigError;
use crate::level::EventLevel;
use serde::{Deserialize, Serialize};

/// Environment variables read by [`BridgeConfig::from_env`].
///
/// These are purely helpers; providers and loggers never read the
/// environment themselves.

/// Minimum engine level, e.g. `Debug` or `warn`.
pub const MINIMUM_LEVEL_ENV: &str = "STRUCTLOG_MINIMUM_LEVEL";

/// Whether to mirror events to stdout through `tracing_subscriber::fmt`.
pub const STDOUT_ENV: &str = "STRUCTLOG_STDOUT";

/// Settings used by [`crate::init`] to assemble a provider.
///
/// **Fields**
/// - `minimum_level`: initial minimum level of the engine logger; it can be
///   changed afterwards through the logger's [`crate::level::LevelSwitch`].
/// - `enable_stdout`: if `true`, events are also forwarded to
///   [`crate::tracing_sink::TracingSink`] and a `fmt` subscriber is
///   installed to print them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub minimum_level: EventLevel,
    pub enable_stdout: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            minimum_level: EventLevel::Information,
            enable_stdout: true,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by [`MINIMUM_LEVEL_ENV`] and [`STDOUT_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(MINIMUM_LEVEL_ENV) {
            config.minimum_level = raw.parse().map_err(|source| ConfigError::InvalidLevel {
                key: MINIMUM_LEVEL_ENV,
                source,
            })?;
        }

        if let Some(raw) = lookup(STDOUT_ENV) {
            config.enable_stdout = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidBool {
                        key: STDOUT_ENV,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        assert_eq!(BridgeConfig::from_lookup(lookup(&[])).unwrap(), BridgeConfig::default());
    }

    #[test]
    fn reads_level_and_stdout() {
        let vars = lookup(&[(MINIMUM_LEVEL_ENV, "debug"), (STDOUT_ENV, "off")]);
        let config = BridgeConfig::from_lookup(vars).unwrap();
        assert_eq!(config.minimum_level, EventLevel::Debug);
        assert!(!config.enable_stdout);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(MINIMUM_LEVEL_ENV, "loud")])),
            Err(ConfigError::InvalidLevel { .. })
        ));
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(STDOUT_ENV, "maybe")])),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"minimum_level":"Warning"}"#).unwrap();
        assert_eq!(config.minimum_level, EventLevel::Warning);
        assert!(config.enable_stdout);
    }
}
