use crate::host::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Severity levels understood by the event engine, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventLevel {
    Verbose = 0,
    Debug = 1,
    Information = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl EventLevel {
    pub const ALL: [EventLevel; 6] = [
        EventLevel::Verbose,
        EventLevel::Debug,
        EventLevel::Information,
        EventLevel::Warning,
        EventLevel::Error,
        EventLevel::Fatal,
    ];

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => EventLevel::Verbose,
            1 => EventLevel::Debug,
            2 => EventLevel::Information,
            3 => EventLevel::Warning,
            4 => EventLevel::Error,
            _ => EventLevel::Fatal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Verbose => "Verbose",
            EventLevel::Debug => "Debug",
            EventLevel::Information => "Information",
            EventLevel::Warning => "Warning",
            EventLevel::Error => "Error",
            EventLevel::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown event level `{0}`")]
pub struct ParseLevelError(pub String);

impl FromStr for EventLevel {
    type Err = ParseLevelError;

    /// Accepts the engine names plus the common short aliases, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" | "trace" => Ok(EventLevel::Verbose),
            "debug" => Ok(EventLevel::Debug),
            "information" | "info" => Ok(EventLevel::Information),
            "warning" | "warn" => Ok(EventLevel::Warning),
            "error" => Ok(EventLevel::Error),
            "fatal" | "critical" => Ok(EventLevel::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Map a host [`LogLevel`] onto the engine's [`EventLevel`].
///
/// Total over the host enum. Anything without a named counterpart lands on
/// [`EventLevel::Verbose`], so unrecognised levels are neither dropped nor
/// reported as more severe than they are.
pub fn map_level(level: LogLevel) -> EventLevel {
    match level {
        LogLevel::Critical => EventLevel::Fatal,
        LogLevel::Error => EventLevel::Error,
        LogLevel::Warning => EventLevel::Warning,
        LogLevel::Information => EventLevel::Information,
        LogLevel::Debug => EventLevel::Debug,
        LogLevel::Trace => EventLevel::Verbose,
        LogLevel::None => EventLevel::Verbose,
    }
}

/// Shared, runtime-adjustable minimum level.
///
/// Cloning yields a handle to the same switch, so a logger and the code
/// that reconfigures it can hold separate copies.
#[derive(Debug, Clone)]
pub struct LevelSwitch {
    minimum: Arc<AtomicU8>,
}

impl LevelSwitch {
    pub fn new(minimum: EventLevel) -> Self {
        Self {
            minimum: Arc::new(AtomicU8::new(minimum as u8)),
        }
    }

    pub fn minimum_level(&self) -> EventLevel {
        EventLevel::from_u8(self.minimum.load(Ordering::Relaxed))
    }

    pub fn set_minimum_level(&self, level: EventLevel) {
        self.minimum.store(level as u8, Ordering::Relaxed);
    }

    pub fn is_enabled(&self, level: EventLevel) -> bool {
        level >= self.minimum_level()
    }
}

impl Default for LevelSwitch {
    fn default() -> Self {
        Self::new(EventLevel::Information)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_host_level() {
        assert_eq!(map_level(LogLevel::Critical), EventLevel::Fatal);
        assert_eq!(map_level(LogLevel::Error), EventLevel::Error);
        assert_eq!(map_level(LogLevel::Warning), EventLevel::Warning);
        assert_eq!(map_level(LogLevel::Information), EventLevel::Information);
        assert_eq!(map_level(LogLevel::Debug), EventLevel::Debug);
        assert_eq!(map_level(LogLevel::Trace), EventLevel::Verbose);
    }

    #[test]
    fn unmapped_levels_fall_back_to_verbose() {
        assert_eq!(map_level(LogLevel::None), EventLevel::Verbose);
        assert_eq!(map_level(LogLevel::from_ordinal(42)), EventLevel::Verbose);
        assert_eq!(map_level(LogLevel::from_ordinal(-1)), EventLevel::Verbose);
    }

    #[test]
    fn switch_is_shared_between_clones() {
        let switch = LevelSwitch::new(EventLevel::Warning);
        let handle = switch.clone();
        assert!(!switch.is_enabled(EventLevel::Information));

        handle.set_minimum_level(EventLevel::Verbose);
        assert!(switch.is_enabled(EventLevel::Verbose));
        assert_eq!(switch.minimum_level(), EventLevel::Verbose);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("warn".parse::<EventLevel>(), Ok(EventLevel::Warning));
        assert_eq!(" Fatal ".parse::<EventLevel>(), Ok(EventLevel::Fatal));
        assert_eq!("trace".parse::<EventLevel>(), Ok(EventLevel::Verbose));
        assert!("loud".parse::<EventLevel>().is_err());
    }
}
