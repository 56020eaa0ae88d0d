use crate::config::BridgeConfig;
use crate::engine::{set_global_logger, EventLogger};
use crate::error::InitError;
use crate::level::LevelSwitch;
use crate::provider::BridgeLoggerProvider;
use crate::sink::{EventSink, FanoutSink};
use crate::tracing_sink::TracingSink;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Build the engine logger described by `config` around `sink`, install it
/// as the global logger and return a provider writing through it.
///
/// **Parameters**
/// - `sink`: implementation of [`EventSink`] that will receive every
///   bridged [`crate::event::LogEvent`].
/// - `config`: [`BridgeConfig`] controlling the minimum level and stdout
///   mirroring.
///
/// **Effects**
///
/// With `enable_stdout`, a [`Registry`] with a `fmt` layer becomes the
/// global `tracing` subscriber and events are also forwarded to
/// [`TracingSink`]; the engine's self-diagnostics print through the same
/// subscriber. Fails if another global subscriber is already installed.
pub fn init_provider_with_config(
    sink: Arc<dyn EventSink>,
    config: BridgeConfig,
) -> Result<BridgeLoggerProvider, InitError> {
    let sink: Arc<dyn EventSink> = if config.enable_stdout {
        let subscriber = Registry::default().with(tracing_subscriber::fmt::layer());
        tracing::subscriber::set_global_default(subscriber)?;
        Arc::new(FanoutSink::new(vec![sink, Arc::new(TracingSink)]))
    } else {
        sink
    };

    let logger = EventLogger::new(sink, LevelSwitch::new(config.minimum_level));
    set_global_logger(logger.clone());
    tracing::debug!(
        target: crate::engine::SELFLOG_TARGET,
        minimum_level = %config.minimum_level,
        enable_stdout = config.enable_stdout,
        "structured logging bridge initialized"
    );
    Ok(BridgeLoggerProvider::new(logger))
}

/// Initialize with [`BridgeConfig::default`]: Information and above, mirrored
/// to stdout.
pub fn init_provider(sink: Arc<dyn EventSink>) -> Result<BridgeLoggerProvider, InitError> {
    init_provider_with_config(sink, BridgeConfig::default())
}
