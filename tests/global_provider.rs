//! Providers created without an explicit engine logger.
//!
//! Kept in its own test binary because it installs the process-wide logger.

use std::sync::Arc;
use structlog_bridge::memory_sink::MemorySink;
use structlog_bridge::{
    set_global_logger, BridgeLoggerProvider, EventLevel, EventLogger, LevelSwitch, Logger,
    LoggerExt, LoggerProvider, StructuredState,
};

#[test]
fn resolves_the_global_logger_when_creating_loggers() {
    let provider = BridgeLoggerProvider::from_global();

    let before = provider.create_logger("early");
    before.log_information("dropped", &[]).unwrap();

    let sink = Arc::new(MemorySink::new());
    set_global_logger(EventLogger::new(sink.clone(), LevelSwitch::new(EventLevel::Verbose)));

    let after = provider.create_logger("late");
    let _scope = after.begin_scope(StructuredState::new().with("Tenant", "acme").into());
    after.log_information("kept", &[]).unwrap();
    before.log_critical("still silent", &[]).unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].properties().get("Tenant").unwrap().to_string(), "\"acme\"");
    assert_eq!(events[0].properties().get("SourceContext").unwrap().to_string(), "\"late\"");
}
