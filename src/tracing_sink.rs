use crate::event::LogEvent;
use crate::level::EventLevel;
use crate::sink::EventSink;
use std::error::Error;
use tracing::Level;

/// Target under which bridged events appear in `tracing`.
pub const TRACING_TARGET: &str = "structlog_bridge::events";

/// Re-emits bridged events as `tracing` events so any installed
/// subscriber (for example the `fmt` layer set up by [`crate::init`])
/// can print them.
///
/// The rendered message becomes the event message; the template text,
/// properties (as JSON) and exception are attached as fields. Fatal maps
/// onto `ERROR` and Verbose onto `TRACE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

macro_rules! forward {
    ($level:expr, $event:expr, $properties:expr) => {
        tracing::event!(
            target: TRACING_TARGET,
            $level,
            template = $event.message_template().text(),
            properties = %$properties,
            exception = $event.exception().map(tracing::field::display),
            "{}",
            $event.render_message()
        )
    };
}

impl EventSink for TracingSink {
    fn emit(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let properties = serde_json::to_string(event.properties())?;
        match event.level() {
            EventLevel::Verbose => forward!(Level::TRACE, event, properties),
            EventLevel::Debug => forward!(Level::DEBUG, event, properties),
            EventLevel::Information => forward!(Level::INFO, event, properties),
            EventLevel::Warning => forward!(Level::WARN, event, properties),
            EventLevel::Error | EventLevel::Fatal => forward!(Level::ERROR, event, properties),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{LogEventProperty, Properties, PropertyValue};
    use crate::template::MessageTemplate;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Registry;

    type Captured = Arc<Mutex<Vec<(Level, BTreeMap<String, String>)>>>;

    struct CaptureLayer(Captured);

    struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S> Layer<S> for CaptureLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != TRACING_TARGET {
                return;
            }
            let mut fields = BTreeMap::new();
            event.record(&mut FieldVisitor(&mut fields));
            if let Ok(mut captured) = self.0.lock() {
                captured.push((*event.metadata().level(), fields));
            }
        }
    }

    #[test]
    fn forwards_rendered_message_and_properties() {
        let captured: Captured = Arc::default();
        let subscriber = Registry::default().with(CaptureLayer(captured.clone()));

        let mut props = Properties::new();
        props.add_if_absent(LogEventProperty::new(
            "Recipient",
            PropertyValue::Scalar(serde_json::json!("World")),
        ));
        let event = LogEvent::new(
            Utc::now(),
            EventLevel::Fatal,
            None,
            MessageTemplate::parse("Hello, {Recipient}"),
            props,
        );

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.emit(&event).unwrap();
        });

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let (level, fields) = &captured[0];
        assert_eq!(*level, Level::ERROR);
        assert_eq!(fields["message"], "Hello, \"World\"");
        assert_eq!(fields["template"], "Hello, {Recipient}");
        assert_eq!(fields["properties"], r#"{"Recipient":"World"}"#);
    }
}
