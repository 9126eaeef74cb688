//! Human-readable console format for development
//!
//! `[2024-01-01 10:30:45] [WRN] [billing] Charge failed for 42 declined`

use super::TextFormatter;
use crate::core::logger::APPLICATION_NAME_PROPERTY;
use crate::core::{timestamp, LogEvent, Result};
use colored::Colorize;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct DebugTextFormatter {
    use_colors: bool,
}

impl Default for DebugTextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTextFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }
}

impl TextFormatter for DebugTextFormatter {
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> Result<()> {
        let level = if self.use_colors {
            event
                .level
                .short_code()
                .color(event.level.color_code())
                .to_string()
        } else {
            event.level.short_code().to_string()
        };

        let application = event
            .properties
            .get(APPLICATION_NAME_PROPERTY)
            .map(|value| value.to_plain_string())
            .unwrap_or_default();

        write!(
            output,
            "[{}] [{}] [{}] {}",
            timestamp::console(&event.timestamp),
            level,
            application,
            escape_control(&event.render_message())
        )?;

        if let Some(ref exception) = event.exception {
            write!(output, " {}", exception)?;
        }
        output.write_all(b"\n")?;
        Ok(())
    }
}

/// Keep one event on one line
fn escape_control(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}
