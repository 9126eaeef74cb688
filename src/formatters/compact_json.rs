//! Compact single-line JSON event formatter
//!
//! One event per line, fields in a fixed order:
//!
//! ```text
//! {"@timestamp":"...Z","LocalDateTime":"...","Message":"...","LogLevel":"warning","Metadata":{...}}
//! ```
//!
//! `Metadata` holds every event property followed by `Exception` when an error
//! is attached.

use super::json_value::{write_quoted_json_string, JsonValueFormatter};
use super::TextFormatter;
use crate::core::{timestamp, LogEvent, LogLevel, Result};
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct CompactJsonFormatter {
    value_formatter: JsonValueFormatter,
}

impl CompactJsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom value formatter for property values
    pub fn with_value_formatter(value_formatter: JsonValueFormatter) -> Self {
        Self { value_formatter }
    }
}

impl TextFormatter for CompactJsonFormatter {
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> Result<()> {
        output.write_all(b"{\"@timestamp\":\"")?;
        output.write_all(timestamp::round_trip_utc(&event.timestamp).as_bytes())?;
        output.write_all(b"\",\"LocalDateTime\":\"")?;
        output.write_all(timestamp::round_trip_local(&event.timestamp).as_bytes())?;
        output.write_all(b"\",\"Message\":")?;
        write_quoted_json_string(&event.render_message(), output)?;
        output.write_all(b",\"LogLevel\":\"")?;
        output.write_all(level_name(u8::from(event.level)).as_bytes())?;
        output.write_all(b"\",\"Metadata\":{")?;

        let mut delimit = false;
        for (name, value) in &event.properties {
            if delimit {
                output.write_all(b",")?;
            }
            delimit = true;
            write_property_name(name, output)?;
            output.write_all(b":")?;
            self.value_formatter.format(value, output)?;
        }

        if let Some(ref exception) = event.exception {
            if delimit {
                output.write_all(b",")?;
            }
            output.write_all(b"\"Exception\":")?;
            write_quoted_json_string(exception, output)?;
        }

        output.write_all(b"}}\n")?;
        Ok(())
    }
}

/// Lowercase level name for a raw level value; unknown values are `none`
pub fn level_name(raw_level: u8) -> &'static str {
    match LogLevel::from_u8(raw_level) {
        Some(LogLevel::Verbose) => "verbose",
        Some(LogLevel::Debug) => "debug",
        Some(LogLevel::Information) => "information",
        Some(LogLevel::Warning) => "warning",
        Some(LogLevel::Error) => "error",
        Some(LogLevel::Fatal) => "fatal",
        None => "none",
    }
}

/// A leading `@` is doubled so property names never collide with reserved
/// `@`-prefixed fields
fn write_property_name(name: &str, output: &mut dyn Write) -> Result<()> {
    if name.starts_with('@') {
        let escaped = format!("@{}", name);
        write_quoted_json_string(&escaped, output)
    } else {
        write_quoted_json_string(name, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MessageTemplate, PropertyValue};
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use std::sync::Arc;

    fn midnight() -> DateTime<FixedOffset> {
        DateTime::<FixedOffset>::from(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid datetime"),
        )
    }

    fn event(level: LogLevel, template: &str, args: Vec<PropertyValue>) -> LogEvent {
        LogEvent::new(level, Arc::new(MessageTemplate::parse(template)), args)
            .with_timestamp(midnight())
    }

    fn format(event: &LogEvent) -> String {
        CompactJsonFormatter::new().format_to_string(event).unwrap()
    }

    #[test]
    fn test_exact_line() {
        let event = event(LogLevel::Warning, "Something happened", vec![])
            .with_property("Caller", "my_app::worker.run()")
            .with_property("FilePath", "src/worker.rs")
            .with_property("LineNumber", "42")
            .with_property("EntityType", "Service")
            .with_property("EntityName", "myapp");

        assert_eq!(
            format(&event),
            "{\"@timestamp\":\"2024-01-01T00:00:00.0000000Z\",\
             \"LocalDateTime\":\"2024-01-01T00:00:00.0000000\",\
             \"Message\":\"Something happened\",\"LogLevel\":\"warning\",\
             \"Metadata\":{\"Caller\":\"my_app::worker.run()\",\"FilePath\":\"src/worker.rs\",\
             \"LineNumber\":\"42\",\"EntityType\":\"Service\",\"EntityName\":\"myapp\"}}\n"
        );
    }

    #[test]
    fn test_empty_metadata() {
        let line = format(&event(LogLevel::Information, "plain", vec![]));
        assert!(line.ends_with(",\"Metadata\":{}}\n"), "got {}", line);
    }

    #[test]
    fn test_exception_without_properties_has_no_leading_comma() {
        let line = format(&event(LogLevel::Error, "boom", vec![]).with_exception("disk full"));
        assert!(line.ends_with("\"Metadata\":{\"Exception\":\"disk full\"}}\n"), "got {}", line);
    }

    #[test]
    fn test_exception_after_properties() {
        let line = format(
            &event(LogLevel::Error, "Charge failed for {OrderId}", vec![42.into()])
                .with_exception("declined"),
        );
        assert!(line.contains("\"Message\":\"Charge failed for 42\""));
        assert!(line.contains("\"LogLevel\":\"error\""));
        assert!(line.ends_with("{\"OrderId\":42,\"Exception\":\"declined\"}}\n"), "got {}", line);
    }

    #[test]
    fn test_at_prefixed_names_are_doubled() {
        let line = format(&event(LogLevel::Warning, "x", vec![]).with_property("@version", 2));
        assert!(line.contains("\"Metadata\":{\"@@version\":2}"), "got {}", line);
    }

    #[test]
    fn test_message_is_escaped() {
        let line = format(&event(LogLevel::Warning, "line1\nline2 \"quoted\"", vec![]));
        assert!(line.contains("\"Message\":\"line1\\nline2 \\\"quoted\\\"\""));
        assert_eq!(line.matches('\n').count(), 1);
        serde_json::from_str::<serde_json::Value>(line.trim_end()).unwrap();
    }

    #[test]
    fn test_level_names() {
        let names: Vec<&str> = (0..=6).map(level_name).collect();
        assert_eq!(
            names,
            vec!["verbose", "debug", "information", "warning", "error", "fatal", "none"]
        );
        assert_eq!(level_name(200), "none");
    }
}
