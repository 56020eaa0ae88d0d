use crate::level::ParseLevelError;

/// Caller-contract violations on the log path.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    #[error("required argument `{0}` is missing")]
    ArgumentMissing(&'static str),
}

/// Error type returned when reading [`crate::config::BridgeConfig`] from the environment.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {source}")]
    InvalidLevel {
        key: &'static str,
        #[source]
        source: ParseLevelError,
    },

    #[error("invalid boolean for {key}: `{value}`")]
    InvalidBool { key: &'static str, value: String },
}

/// Error type returned by [`crate::init`].
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}
