use crate::host::Exception;
use crate::level::EventLevel;
use crate::template::MessageTemplate;
use chrono::{DateTime, Utc};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Captured value of a single event property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Null, boolean, number or string.
    Scalar(Value),
    /// Deep structural capture, kept as a JSON tree.
    Structured(Value),
}

impl PropertyValue {
    pub fn as_value(&self) -> &Value {
        match self {
            PropertyValue::Scalar(v) | PropertyValue::Structured(v) => v,
        }
    }

    /// Append the textual form of this value to `out`.
    ///
    /// Strings are quoted unless `format` is `l` (literal). Structured values
    /// render as compact JSON.
    pub fn render(&self, format: Option<&str>, out: &mut String) {
        match self {
            PropertyValue::Scalar(Value::String(s)) => {
                if format == Some("l") {
                    out.push_str(s);
                } else {
                    out.push('"');
                    for c in s.chars() {
                        if c == '"' || c == '\\' {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                    out.push('"');
                }
            }
            PropertyValue::Scalar(v) | PropertyValue::Structured(v) => {
                out.push_str(&v.to_string());
            }
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(None, &mut out);
        f.write_str(&out)
    }
}

/// A named property attached to a [`LogEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogEventProperty {
    pub name: String,
    pub value: PropertyValue,
}

impl LogEventProperty {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Insertion-ordered property map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: IndexMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Add `property` unless one with the same name is already present.
    /// Returns whether it was added.
    pub fn add_if_absent(&mut self, property: LogEventProperty) -> bool {
        match self.entries.entry(property.name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(property.value);
                true
            }
        }
    }

    /// Add `property`, replacing the value of an existing one in place.
    pub fn add_or_update(&mut self, property: LogEventProperty) {
        self.entries.insert(property.name, property.value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// One structured log occurrence as seen by enrichers and sinks.
#[derive(Debug, Clone)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    level: EventLevel,
    exception: Option<Exception>,
    template: MessageTemplate,
    properties: Properties,
}

impl LogEvent {
    pub fn new(
        timestamp: DateTime<Utc>,
        level: EventLevel,
        exception: Option<Exception>,
        template: MessageTemplate,
        properties: Properties,
    ) -> Self {
        Self {
            timestamp,
            level,
            exception,
            template,
            properties,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn level(&self) -> EventLevel {
        self.level
    }

    pub fn exception(&self) -> Option<&Exception> {
        self.exception.as_ref()
    }

    pub fn message_template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Used by enrichers at write time.
    pub fn add_property_if_absent(&mut self, property: LogEventProperty) -> bool {
        self.properties.add_if_absent(property)
    }

    pub fn add_or_update_property(&mut self, property: LogEventProperty) {
        self.properties.add_or_update(property)
    }

    /// Render the template against this event's properties.
    pub fn render_message(&self) -> String {
        self.template.render(&self.properties)
    }
}

/// Turns raw values into event properties.
pub trait PropertyFactory: Send + Sync {
    fn create_property(&self, name: &str, value: &Value, destructure: bool) -> LogEventProperty;
}

/// Default capture policy.
///
/// Without destructuring, scalars are kept as they are and composite values
/// are flattened to their string form. With destructuring, composite values
/// keep their full structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapturingPropertyFactory;

impl PropertyFactory for CapturingPropertyFactory {
    fn create_property(&self, name: &str, value: &Value, destructure: bool) -> LogEventProperty {
        let captured = match value {
            Value::Array(_) | Value::Object(_) if destructure => {
                PropertyValue::Structured(value.clone())
            }
            Value::Array(_) | Value::Object(_) => {
                PropertyValue::Scalar(Value::String(value.to_string()))
            }
            _ => PropertyValue::Scalar(value.clone()),
        };
        LogEventProperty::new(name, captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_property_wins() {
        let name = |value: &str| LogEventProperty::new("Name", PropertyValue::Scalar(json!(value)));
        let mut props = Properties::new();
        assert!(props.add_if_absent(name("a")));
        assert!(!props.add_if_absent(name("b")));
        assert_eq!(props.get("Name"), Some(&PropertyValue::Scalar(json!("a"))));

        props.add_if_absent(LogEventProperty::new("Other", PropertyValue::Scalar(json!(1))));
        props.add_or_update(name("c"));
        assert_eq!(props.len(), 2);
        let names: Vec<_> = props.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Name", "Other"]);
        assert_eq!(props.get("Name").map(|v| v.to_string()), Some("\"c\"".to_string()));
    }

    #[test]
    fn renders_scalars_like_the_engine() {
        assert_eq!(PropertyValue::Scalar(json!("pizza")).to_string(), "\"pizza\"");
        assert_eq!(PropertyValue::Scalar(json!(7)).to_string(), "7");
        assert_eq!(PropertyValue::Scalar(json!(null)).to_string(), "null");
        assert_eq!(PropertyValue::Scalar(json!("say \"hi\"")).to_string(), r#""say \"hi\"""#);

        let mut out = String::new();
        PropertyValue::Scalar(json!("raw")).render(Some("l"), &mut out);
        assert_eq!(out, "raw");
    }

    #[test]
    fn capture_respects_destructuring() {
        let factory = CapturingPropertyFactory;
        let order = json!({"id": 3, "items": ["a"]});

        let flat = factory.create_property("Order", &order, false);
        assert_eq!(flat.value, PropertyValue::Scalar(Value::String(order.to_string())));

        let deep = factory.create_property("Order", &order, true);
        assert_eq!(deep.value, PropertyValue::Structured(order.clone()));

        let scalar = factory.create_property("Count", &json!(2), true);
        assert_eq!(scalar.value, PropertyValue::Scalar(json!(2)));
    }

    #[test]
    fn properties_serialize_in_insertion_order() {
        let mut props = Properties::new();
        props.add_if_absent(LogEventProperty::new("b", PropertyValue::Scalar(json!(1))));
        props.add_if_absent(LogEventProperty::new("a", PropertyValue::Structured(json!([1, 2]))));
        assert_eq!(serde_json::to_string(&props).unwrap(), r#"{"b":1,"a":[1,2]}"#);
    }
}
