use serde_json::json;
use std::sync::Arc;
use structlog_bridge::memory_sink::MemorySink;
use structlog_bridge::{
    flow, BridgeLoggerProvider, EventLevel, EventLogger, LevelSwitch, Logger, LoggerExt,
    LoggerProvider, StructuredState,
};

/// Simulates a service handling several requests concurrently, each inside
/// its own logging scope, and prints what the sink received.
#[tokio::main]
async fn main() {
    let sink = Arc::new(MemorySink::new());
    let engine = EventLogger::new(sink.clone(), LevelSwitch::new(EventLevel::Debug));
    let provider = BridgeLoggerProvider::new(engine);
    let logger = Arc::new(provider.create_logger("demo::handler"));

    let _service = logger.begin_scope(StructuredState::new().with("Service", "checkout").into());

    let mut tasks = Vec::new();
    for request_id in 1..=3u64 {
        let logger = logger.clone();
        tasks.push(flow::spawn(async move {
            let _request = logger.begin_scope(
                StructuredState::formatted("Request {RequestId}", &[json!(request_id)]).into(),
            );
            logger.log_debug("validating cart", &[]).unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10 * request_id)).await;
            let args = [json!(19.99), json!({"items": request_id})];
            logger.log_information("charged {Amount} for {@Cart}", &args).unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for event in sink.drain() {
        println!(
            "[{}] {} {}",
            event.level(),
            event.render_message(),
            serde_json::to_string(event.properties()).unwrap()
        );
    }
}
