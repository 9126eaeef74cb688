//! Formatter implementations

pub mod compact_json;
pub mod debug_text;
pub mod json_value;

pub use compact_json::CompactJsonFormatter;
pub use debug_text::DebugTextFormatter;
pub use json_value::JsonValueFormatter;

use crate::core::{LogEvent, LoggerError, Result};
use std::io::Write;

/// Turns a log event into text written to a sink's output
pub trait TextFormatter: Send + Sync {
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> Result<()>;

    /// Format into a fresh string
    fn format_to_string(&self, event: &LogEvent) -> Result<String> {
        let mut buffer = Vec::new();
        self.format(event, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| LoggerError::formatter("utf8", e.to_string()))
    }
}
