use std::error::Error;
use std::sync::Arc;

use serde_json::json;
use structlog_bridge::event::LogEvent;
use structlog_bridge::sink::EventSink;
use structlog_bridge::{
    BridgeLoggerProvider, EventLevel, EventLogger, LevelSwitch, LoggerExt, LoggerProvider,
};

/// Example of plugging in a completely custom destination by implementing
/// `EventSink` directly. Imagine this talks to some proprietary store; for
/// the sake of example it prints one JSON line per event.
struct JsonLinesSink;

impl EventSink for JsonLinesSink {
    fn emit(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let line = json!({
            "timestamp": event.timestamp().to_rfc3339(),
            "level": event.level(),
            "template": event.message_template().text(),
            "message": event.render_message(),
            "properties": event.properties(),
            "exception": event.exception().map(|e| e.to_string()),
        });
        println!("{line}");
        Ok(())
    }
}

fn main() {
    let switch = LevelSwitch::new(EventLevel::Information);
    let engine = EventLogger::new(Arc::new(JsonLinesSink), switch);
    let provider = BridgeLoggerProvider::new(engine);
    let logger = provider.create_logger("demo::custom");

    logger.log_information("custom sink example started", &[]).unwrap();
    logger.log_warning("disk {Mount} at {Percent}%", &[json!("/var"), json!(91)]).unwrap();
}
