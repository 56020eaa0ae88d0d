use crate::engine::EventLogger;
use crate::error::LogError;
use crate::event::{LogEvent, LogEventProperty, Properties, PropertyFactory, PropertyValue};
use crate::host::{Formatter, LogInvocation, LogLevel, Logger, State, ORIGINAL_FORMAT};
use crate::level::map_level;
use crate::provider::BridgeLoggerProvider;
use crate::scope::{ProviderId, ScopeGuard};
use crate::template::MessageTemplate;
use chrono::Utc;
use serde_json::Value;

/// Property carrying the category name of the logger that wrote an event.
pub const SOURCE_CONTEXT: &str = "SourceContext";

/// Property carrying a nonzero host event id.
pub const EVENT_ID: &str = "EventId";

/// Property used for scalar states.
pub const STATE: &str = "State";

/// Host [`Logger`] that translates each call into a [`LogEvent`] for an
/// [`EventLogger`].
///
/// Built by [`BridgeLoggerProvider::create_logger`](crate::host::LoggerProvider::create_logger);
/// the engine logger it writes through already carries the provider's
/// scope enricher and, for named loggers, a `SourceContext` property.
#[derive(Clone)]
pub struct BridgeLogger {
    owner: ProviderId,
    name: Option<String>,
    logger: EventLogger,
}

impl BridgeLogger {
    pub(crate) fn new(provider: &BridgeLoggerProvider, name: &str) -> Self {
        let mut logger = provider.engine_logger();
        let name = if name.is_empty() {
            None
        } else {
            logger = logger.for_context(SOURCE_CONTEXT, name, false);
            Some(name.to_string())
        };
        Self {
            owner: provider.id(),
            name,
            logger,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Logger for BridgeLogger {
    type Scope = ScopeGuard;

    fn is_enabled(&self, level: LogLevel) -> bool {
        self.logger.is_enabled(map_level(level))
    }

    fn log(&self, invocation: LogInvocation<'_>) -> Result<(), LogError> {
        let level = map_level(invocation.level);
        if !self.logger.is_enabled(level) {
            return Ok(());
        }

        let formatter = invocation.formatter.ok_or(LogError::ArgumentMissing("formatter"))?;
        let factory = self.logger.property_factory();

        let mut properties = Properties::new();
        let captured = capture_state(&invocation.state, formatter, factory, &mut properties);
        let template = match captured {
            Some(template) if !template.is_empty() => template,
            _ => return Ok(()),
        };

        if invocation.event_id != 0 {
            let event_id = Value::from(invocation.event_id);
            properties.add_if_absent(factory.create_property(EVENT_ID, &event_id, false));
        }

        let event = LogEvent::new(
            Utc::now(),
            level,
            invocation.exception,
            MessageTemplate::parse(&template),
            properties,
        );
        self.logger.write(event);
        Ok(())
    }

    fn begin_scope(&self, state: State) -> ScopeGuard {
        ScopeGuard::push(self.owner, self.name.clone(), state)
    }
}

/// Fill `properties` from `state` and return the template text, if the state
/// yields one.
fn capture_state(
    state: &State,
    formatter: &Formatter,
    factory: &dyn PropertyFactory,
    properties: &mut Properties,
) -> Option<String> {
    let mut template = None;

    if let State::Structured(structured) = state {
        for (key, value) in structured.pairs() {
            match value {
                Value::String(text) if key == ORIGINAL_FORMAT => {
                    template = Some(text.clone());
                }
                _ => {
                    let property = match key.strip_prefix('@') {
                        Some(name) => factory.create_property(name, value, true),
                        None => factory.create_property(key, value, false),
                    };
                    properties.add_if_absent(property);
                }
            }
        }

        if template.is_none() {
            if let Some(type_name) = structured.type_name() {
                properties.add_if_absent(formatted(type_name, state, formatter));
                template = Some(format!("{{{type_name}:l}}"));
            }
        }
    }

    if template.is_none() && !state.is_absent() {
        properties.add_if_absent(formatted(STATE, state, formatter));
        template = Some(format!("{{{STATE}:l}}"));
    }

    template
}

fn formatted(name: &str, state: &State, formatter: &Formatter) -> LogEventProperty {
    LogEventProperty::new(name, PropertyValue::Scalar(Value::String(formatter(state, None))))
}
