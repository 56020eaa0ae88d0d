use crate::event::{CapturingPropertyFactory, LogEvent, LogEventProperty, PropertyFactory};
use crate::level::{EventLevel, LevelSwitch};
use crate::noop_sink::NoopSink;
use crate::sink::EventSink;
use serde_json::Value;
use std::sync::{Arc, OnceLock, RwLock};

/// Target of the engine's own diagnostics.
pub const SELFLOG_TARGET: &str = "structlog_bridge::selflog";

/// Adds properties to an event while it is being written.
pub trait Enricher: Send + Sync {
    fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory);
}

/// The engine-side logger: a level gate, context properties, enrichers and
/// a sink.
///
/// Cheap to clone. [`for_context`](Self::for_context) and
/// [`for_enricher`](Self::for_enricher) return derived loggers that share
/// the sink and level switch of their parent.
#[derive(Clone)]
pub struct EventLogger {
    sink: Arc<dyn EventSink>,
    level: LevelSwitch,
    context: Vec<LogEventProperty>,
    enrichers: Vec<Arc<dyn Enricher>>,
    factory: Arc<dyn PropertyFactory>,
}

impl EventLogger {
    pub fn new(sink: Arc<dyn EventSink>, level: LevelSwitch) -> Self {
        Self {
            sink,
            level,
            context: Vec::new(),
            enrichers: Vec::new(),
            factory: Arc::new(CapturingPropertyFactory),
        }
    }

    /// A logger whose gate only passes Fatal, into a sink that discards it.
    pub fn silent() -> Self {
        Self::new(Arc::new(NoopSink), LevelSwitch::new(EventLevel::Fatal))
    }

    /// Replace the capture policy used for context properties and enrichers.
    pub fn with_property_factory(mut self, factory: Arc<dyn PropertyFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn property_factory(&self) -> &dyn PropertyFactory {
        self.factory.as_ref()
    }

    pub fn level_switch(&self) -> &LevelSwitch {
        &self.level
    }

    pub fn is_enabled(&self, level: EventLevel) -> bool {
        self.level.is_enabled(level)
    }

    /// Derive a logger that attaches `name = value` to every event it writes.
    pub fn for_context(&self, name: &str, value: impl Into<Value>, destructure: bool) -> Self {
        let mut derived = self.clone();
        let property = self.factory.create_property(name, &value.into(), destructure);
        derived.context.push(property);
        derived
    }

    /// Derive a logger that runs `enricher` on every event it writes.
    pub fn for_enricher(&self, enricher: Arc<dyn Enricher>) -> Self {
        let mut derived = self.clone();
        derived.enrichers.push(enricher);
        derived
    }

    /// Write `event` to the sink.
    ///
    /// Context properties are added first, then enrichers run in
    /// registration order. Both only fill in properties the event does not
    /// already carry. Sink failures are reported on [`SELFLOG_TARGET`].
    pub fn write(&self, mut event: LogEvent) {
        if !self.is_enabled(event.level()) {
            return;
        }

        for property in &self.context {
            event.add_property_if_absent(property.clone());
        }
        for enricher in &self.enrichers {
            enricher.enrich(&mut event, self.factory.as_ref());
        }

        if let Err(e) = self.sink.emit(&event) {
            tracing::warn!(target: SELFLOG_TARGET, error = %e, "event sink failed to emit event");
        }
    }

    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(target: SELFLOG_TARGET, error = %e, "event sink failed to flush");
        }
    }
}

fn global_slot() -> &'static RwLock<Option<EventLogger>> {
    static GLOBAL: OnceLock<RwLock<Option<EventLogger>>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(None))
}

/// Install the process-wide default logger, returning the previous one.
pub fn set_global_logger(logger: EventLogger) -> Option<EventLogger> {
    let mut slot = global_slot().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.replace(logger)
}

/// The process-wide default logger; [`EventLogger::silent`] until one is set.
pub fn global_logger() -> EventLogger {
    let slot = global_slot().read().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.clone().unwrap_or_else(EventLogger::silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Properties, PropertyValue};
    use crate::memory_sink::MemorySink;
    use crate::template::MessageTemplate;
    use chrono::Utc;
    use serde_json::json;

    fn event(level: EventLevel, props: Properties) -> LogEvent {
        LogEvent::new(Utc::now(), level, None, MessageTemplate::parse("m"), props)
    }

    struct Tag(&'static str);

    impl Enricher for Tag {
        fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory) {
            event.add_property_if_absent(factory.create_property("Tag", &json!(self.0), false));
        }
    }

    #[test]
    fn drops_events_below_minimum() {
        let sink = Arc::new(MemorySink::new());
        let logger = EventLogger::new(sink.clone(), LevelSwitch::new(EventLevel::Warning));

        logger.write(event(EventLevel::Information, Properties::new()));
        logger.write(event(EventLevel::Error, Properties::new()));

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].level(), EventLevel::Error);
    }

    #[test]
    fn event_properties_beat_context_and_enrichers() {
        let sink = Arc::new(MemorySink::new());
        let logger = EventLogger::new(sink.clone(), LevelSwitch::new(EventLevel::Verbose))
            .for_context("Tag", "context", false)
            .for_enricher(Arc::new(Tag("enricher")));

        logger.write(event(EventLevel::Information, Properties::new()));
        let mut own = Properties::new();
        own.add_if_absent(LogEventProperty::new("Tag", PropertyValue::Scalar(json!("event"))));
        logger.write(event(EventLevel::Information, own));

        let events = sink.events();
        assert_eq!(events[0].properties().get("Tag").unwrap().to_string(), "\"context\"");
        assert_eq!(events[1].properties().get("Tag").unwrap().to_string(), "\"event\"");
    }

    #[test]
    fn derived_loggers_do_not_change_the_parent() {
        let sink = Arc::new(MemorySink::new());
        let root = EventLogger::new(sink.clone(), LevelSwitch::new(EventLevel::Verbose));
        let _child = root.for_context("Child", true, false);

        root.write(event(EventLevel::Information, Properties::new()));
        assert!(sink.events()[0].properties().is_empty());
    }

    struct Offline;

    impl EventSink for Offline {
        fn emit(&self, _event: &LogEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("sink offline".into())
        }
    }

    #[test]
    fn sink_failures_stay_inside_the_engine() {
        let logger = EventLogger::new(Arc::new(Offline), LevelSwitch::new(EventLevel::Verbose));
        logger.write(event(EventLevel::Error, Properties::new()));
        logger.flush();
    }

    #[test]
    fn silent_logger_gates_below_fatal() {
        let logger = EventLogger::silent();
        for level in EventLevel::ALL.into_iter().take(5) {
            assert!(!logger.is_enabled(level));
        }
    }
}
