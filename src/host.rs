//! The host logging abstraction: what application code programs against.
//!
//! Nothing here knows about the event engine. [`crate::logger::BridgeLogger`]
//! and [`crate::provider::BridgeLoggerProvider`] implement these traits.

use crate::error::LogError;
use crate::template::{CaptureHint, MessageTemplate, TemplateToken};
use serde_json::Value;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Reserved key whose string value carries the message template of a
/// structured state. Shared by the translator and the scope enricher.
pub const ORIGINAL_FORMAT: &str = "{OriginalFormat}";

/// An error attached to a log call, carried by identity into the event.
pub type Exception = Arc<dyn Error + Send + Sync>;

/// Renders a state (and optionally an exception) to text.
pub type Formatter = dyn Fn(&State, Option<&Exception>) -> String + Send + Sync;

/// Host severity levels, in increasing order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Information = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
    /// Not a severity; used by hosts to switch a category off.
    None = 6,
}

impl LogLevel {
    /// Convert a raw ordinal. Anything outside the named range becomes
    /// [`LogLevel::None`].
    pub fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Information,
            3 => LogLevel::Warning,
            4 => LogLevel::Error,
            5 => LogLevel::Critical,
            _ => LogLevel::None,
        }
    }
}

/// Ordered key/value pairs, optionally tagged with the name of the type
/// that produced them.
///
/// A missing type name stands for a generic or anonymous producer; such
/// states never get a type-named fallback template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredState {
    type_name: Option<Cow<'static, str>>,
    pairs: Vec<(String, Value)>,
}

impl StructuredState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            pairs: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// State for a templated message such as `"Hello, {Recipient}"`.
    ///
    /// Arguments bind to placeholders in order of appearance; the template
    /// itself is appended under [`ORIGINAL_FORMAT`]. Placeholders written as
    /// `{@Name}` keep the sigil on their key so the value is destructured.
    pub fn formatted(format: &str, args: &[Value]) -> Self {
        let template = MessageTemplate::parse(format);
        let keys = template.tokens().iter().filter_map(|token| match token {
            TemplateToken::Property {
                name,
                hint: CaptureHint::Destructure,
                ..
            } => Some(format!("@{name}")),
            TemplateToken::Property { name, .. } => Some(name.clone()),
            TemplateToken::Text(_) => None,
        });
        let mut state = StructuredState::new();
        for (key, arg) in keys.zip(args) {
            state.push(key, arg.clone());
        }
        state.push(ORIGINAL_FORMAT, format);
        state
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn pairs(&self) -> &[(String, Value)] {
        &self.pairs
    }

    /// The `{OriginalFormat}` text, if present.
    pub fn original_format(&self) -> Option<&str> {
        self.pairs.iter().find_map(|(k, v)| match v {
            Value::String(s) if k == ORIGINAL_FORMAT => Some(s.as_str()),
            _ => None,
        })
    }

    fn value_of(&self, key: &str) -> Option<&Value> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn value_for(&self, name: &str, hint: CaptureHint) -> Option<&Value> {
        match hint {
            CaptureHint::Destructure => self
                .value_of(&format!("@{name}"))
                .or_else(|| self.value_of(name)),
            _ => self.value_of(name),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StructuredState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = StructuredState::new();
        for (k, v) in iter {
            state.push(k, v);
        }
        state
    }
}

impl fmt::Display for StructuredState {
    /// Templated states render their template with raw values; named states
    /// render as their type name; anything else as `key=value` pairs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(format) = self.original_format() {
            let template = MessageTemplate::parse(format);
            for token in template.tokens() {
                match token {
                    TemplateToken::Text(text) => f.write_str(text)?,
                    TemplateToken::Property { raw, name, hint, .. } => {
                        match self.value_for(name, *hint) {
                            Some(value) => write_raw(f, value)?,
                            None => f.write_str(raw)?,
                        }
                    }
                }
            }
            return Ok(());
        }
        if let Some(name) = &self.type_name {
            return f.write_str(name);
        }
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}=")?;
            write_raw(f, v)?;
        }
        Ok(())
    }
}

fn write_raw(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => f.write_str(s),
        Value::Null => f.write_str("null"),
        other => write!(f, "{other}"),
    }
}

/// The payload of a log call or scope, classified once at the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum State {
    Structured(StructuredState),
    Scalar(Value),
    #[default]
    Absent,
}

impl State {
    pub fn is_absent(&self) -> bool {
        matches!(self, State::Absent)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Structured(s) => fmt::Display::fmt(s, f),
            State::Scalar(v) => write_raw(f, v),
            State::Absent => f.write_str("null"),
        }
    }
}

impl From<StructuredState> for State {
    fn from(state: StructuredState) -> Self {
        State::Structured(state)
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        State::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        State::Scalar(Value::String(s))
    }
}

impl<T: Into<State>> From<Option<T>> for State {
    fn from(state: Option<T>) -> Self {
        state.map(Into::into).unwrap_or(State::Absent)
    }
}

/// Formatter used by the [`LoggerExt`] helpers: the state's display form.
pub fn default_formatter(state: &State, _exception: Option<&Exception>) -> String {
    state.to_string()
}

/// One log call, as issued through the host abstraction.
pub struct LogInvocation<'a> {
    pub level: LogLevel,
    /// Zero means no event id.
    pub event_id: i32,
    pub state: State,
    pub exception: Option<Exception>,
    pub formatter: Option<&'a Formatter>,
}

impl<'a> LogInvocation<'a> {
    pub fn new(level: LogLevel, state: impl Into<State>, formatter: &'a Formatter) -> Self {
        Self {
            level,
            event_id: 0,
            state: state.into(),
            exception: None,
            formatter: Some(formatter),
        }
    }

    pub fn with_event_id(mut self, event_id: i32) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_exception(mut self, exception: Exception) -> Self {
        self.exception = Some(exception);
        self
    }
}

/// A category logger in the host abstraction.
pub trait Logger: Send + Sync {
    /// Handle that closes the scope when dropped.
    type Scope;

    fn is_enabled(&self, level: LogLevel) -> bool;

    fn log(&self, invocation: LogInvocation<'_>) -> Result<(), LogError>;

    fn begin_scope(&self, state: State) -> Self::Scope;
}

/// Factory for category loggers.
pub trait LoggerProvider: Send + Sync {
    type Logger: Logger;

    fn create_logger(&self, name: &str) -> Self::Logger;
}

/// Convenience calls for templated messages, available on every [`Logger`].
pub trait LoggerExt: Logger {
    fn log_message(&self, level: LogLevel, format: &str, args: &[Value]) -> Result<(), LogError> {
        self.log(LogInvocation::new(
            level,
            StructuredState::formatted(format, args),
            &default_formatter,
        ))
    }

    fn log_trace(&self, format: &str, args: &[Value]) -> Result<(), LogError> {
        self.log_message(LogLevel::Trace, format, args)
    }

    fn log_debug(&self, format: &str, args: &[Value]) -> Result<(), LogError> {
        self.log_message(LogLevel::Debug, format, args)
    }

    fn log_information(&self, format: &str, args: &[Value]) -> Result<(), LogError> {
        self.log_message(LogLevel::Information, format, args)
    }

    fn log_warning(&self, format: &str, args: &[Value]) -> Result<(), LogError> {
        self.log_message(LogLevel::Warning, format, args)
    }

    fn log_error(
        &self,
        exception: Option<Exception>,
        format: &str,
        args: &[Value],
    ) -> Result<(), LogError> {
        let mut invocation = LogInvocation::new(
            LogLevel::Error,
            StructuredState::formatted(format, args),
            &default_formatter,
        );
        invocation.exception = exception;
        self.log(invocation)
    }

    fn log_critical(&self, format: &str, args: &[Value]) -> Result<(), LogError> {
        self.log_message(LogLevel::Critical, format, args)
    }
}

impl<L: Logger + ?Sized> LoggerExt for L {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formatted_values_bind_arguments_in_order() {
        let state = StructuredState::formatted("{A} then {B}", &[json!(1), json!("two")]);
        assert_eq!(
            state.pairs(),
            &[
                ("A".to_string(), json!(1)),
                ("B".to_string(), json!("two")),
                (ORIGINAL_FORMAT.to_string(), json!("{A} then {B}")),
            ]
        );
        assert_eq!(state.to_string(), "1 then two");
    }

    #[test]
    fn formatted_values_keep_the_destructuring_sigil() {
        let cart = json!({"items": 2});
        let args = [json!(5), cart.clone()];
        let state = StructuredState::formatted("charged {Amount} for {@Cart}", &args);
        assert_eq!(state.pairs()[0], ("Amount".to_string(), json!(5)));
        assert_eq!(state.pairs()[1], ("@Cart".to_string(), cart));
        assert_eq!(state.to_string(), r#"charged 5 for {"items":2}"#);
    }

    #[test]
    fn structured_display_falls_back_to_type_name_then_pairs() {
        let named = StructuredState::named("FoodScope").with("Name", "pizza");
        assert_eq!(named.to_string(), "FoodScope");

        let anonymous: StructuredState = [("Name", json!("pizza")), ("Count", json!(2))]
            .into_iter()
            .collect();
        assert_eq!(anonymous.to_string(), "Name=pizza, Count=2");
    }

    #[test]
    fn optional_state_maps_none_to_absent() {
        assert!(State::from(None::<&str>).is_absent());
        assert_eq!(State::from(Some("x")), State::Scalar(json!("x")));
    }

    #[test]
    fn non_string_original_format_is_not_a_template() {
        let state = StructuredState::new().with(ORIGINAL_FORMAT, 5);
        assert_eq!(state.original_format(), None);
    }

    #[test]
    fn ordinals_outside_the_enum_become_none() {
        assert_eq!(LogLevel::from_ordinal(3), LogLevel::Warning);
        assert_eq!(LogLevel::from_ordinal(99), LogLevel::None);
    }
}
