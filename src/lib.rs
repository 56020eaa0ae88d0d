pub mod host;
pub mod level;
pub mod template;
pub mod event;
pub mod engine;
pub mod sink;
pub mod noop_sink;
pub mod memory_sink;
pub mod tracing_sink;
pub mod scope;
pub mod flow;
pub mod logger;
pub mod provider;
pub mod config;
pub mod error;
pub mod init;

pub use engine::{global_logger, set_global_logger, EventLogger};
pub use error::LogError;
pub use flow::FlowExt;
pub use host::{LogInvocation, LogLevel, Logger, LoggerExt, LoggerProvider, State, StructuredState};
pub use level::{map_level, EventLevel, LevelSwitch};
pub use logger::BridgeLogger;
pub use provider::BridgeLoggerProvider;
pub use scope::{ScopeGuard, ScopeSnapshot};
