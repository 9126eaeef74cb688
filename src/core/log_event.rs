//! Log event structure

use super::{
    log_level::LogLevel,
    message_template::MessageTemplate,
    property_value::{Properties, PropertyValue},
    timestamp,
};
use chrono::{DateTime, FixedOffset};
use std::error::Error;
use std::sync::Arc;

/// A single log event as handed to sinks.
///
/// `properties` keeps insertion order, which is the order properties are
/// written under `Metadata`.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub level: LogLevel,
    pub template: Arc<MessageTemplate>,
    pub properties: Properties,
    pub exception: Option<String>,
}

impl LogEvent {
    /// Create an event timestamped now, binding `args` to the template's
    /// placeholders
    pub fn new(
        level: LogLevel,
        template: Arc<MessageTemplate>,
        args: impl IntoIterator<Item = PropertyValue>,
    ) -> Self {
        let properties = template.bind(args);
        Self {
            timestamp: timestamp::now(),
            level,
            template,
            properties,
            exception: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a property unless one with the same name is already bound
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.entry(name.into()).or_insert_with(|| value.into());
        self
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_error(self, error: &(dyn Error + 'static)) -> Self {
        self.with_exception(describe_error(error))
    }

    /// The template rendered against every property of the event
    pub fn render_message(&self) -> String {
        self.template.render(&self.properties)
    }
}

/// `Display` of the error followed by its `source()` chain
pub fn describe_error(error: &(dyn Error + 'static)) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        description.push_str("\nCaused by: ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}
