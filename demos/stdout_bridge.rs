use serde_json::json;
use std::sync::Arc;
use structlog_bridge::config::BridgeConfig;
use structlog_bridge::init::init_provider_with_config;
use structlog_bridge::noop_sink::NoopSink;
use structlog_bridge::{Logger, LoggerExt, LoggerProvider, StructuredState};

fn main() {
    let config = BridgeConfig {
        enable_stdout: true,
        ..BridgeConfig::from_env().unwrap_or_default()
    };

    let provider =
        init_provider_with_config(Arc::new(NoopSink), config).expect("initialize bridge");
    let logger = provider.create_logger("demo::stdout");

    logger.log_information("starting {App}", &[json!("stdout_bridge")]).unwrap();

    let _scope = logger.begin_scope(StructuredState::new().with("UserId", 42).into());
    logger
        .log_error(None, "authentication failed: {Reason}", &[json!("invalid password")])
        .unwrap();
}
