//! Console sink implementation

use crate::core::{LogEvent, Result, Sink};
use crate::formatters::{CompactJsonFormatter, DebugTextFormatter, TextFormatter};
use std::io::Write;

/// Writes formatted events to stdout, or to an injected writer.
///
/// # Example
///
/// ```
/// use compact_logger::appenders::ConsoleSink;
///
/// let production = ConsoleSink::json();
/// let development = ConsoleSink::debug(false);
/// assert_eq!(production.format_name(), "json");
/// assert_eq!(development.format_name(), "debug");
/// ```
pub struct ConsoleSink {
    formatter: Box<dyn TextFormatter>,
    format_name: &'static str,
    /// `None` writes to stdout
    writer: Option<Box<dyn Write + Send + Sync>>,
    buffer: Vec<u8>,
}

impl ConsoleSink {
    /// One compact JSON object per line
    pub fn json() -> Self {
        Self::new(Box::new(CompactJsonFormatter::new()), "json")
    }

    /// `[yyyy-MM-dd HH:mm:ss] [LVL] [ApplicationName] Message Exception`
    pub fn debug(use_colors: bool) -> Self {
        Self::new(Box::new(DebugTextFormatter::with_colors(use_colors)), "debug")
    }

    /// Write through `formatter` into `writer` instead of stdout
    pub fn with_writer(
        formatter: Box<dyn TextFormatter>,
        writer: Box<dyn Write + Send + Sync>,
    ) -> Self {
        let mut sink = Self::new(formatter, "custom");
        sink.writer = Some(writer);
        sink
    }

    fn new(formatter: Box<dyn TextFormatter>, format_name: &'static str) -> Self {
        Self {
            formatter,
            format_name,
            writer: None,
            buffer: Vec::with_capacity(512),
        }
    }

    pub fn format_name(&self) -> &'static str {
        self.format_name
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::json()
    }
}

impl Sink for ConsoleSink {
    fn emit(&mut self, event: &LogEvent) -> Result<()> {
        // Format fully before writing so a failed format leaves no partial line
        self.buffer.clear();
        self.formatter.format(event, &mut self.buffer)?;

        match self.writer {
            Some(ref mut writer) => writer.write_all(&self.buffer)?,
            None => std::io::stdout().lock().write_all(&self.buffer)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.writer {
            Some(ref mut writer) => writer.flush()?,
            None => std::io::stdout().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, MessageTemplate, PropertyValue};
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn event() -> LogEvent {
        LogEvent::new(
            LogLevel::Warning,
            Arc::new(MessageTemplate::parse("Disk at {Percent}")),
            vec![PropertyValue::from(91)],
        )
    }

    #[test]
    fn test_json_lines_to_writer() {
        let buffer = SharedBuffer::default();
        let mut sink = ConsoleSink::with_writer(
            Box::new(CompactJsonFormatter::new()),
            Box::new(buffer.clone()),
        );

        sink.emit(&event()).unwrap();
        sink.emit(&event()).unwrap();
        sink.flush().unwrap();

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["Message"], "Disk at 91");
        assert_eq!(parsed["Metadata"]["Percent"], 91);
    }

    #[test]
    fn test_debug_text_to_writer() {
        let buffer = SharedBuffer::default();
        let mut sink = ConsoleSink::with_writer(
            Box::new(DebugTextFormatter::with_colors(false)),
            Box::new(buffer.clone()),
        );

        sink.emit(&event()).unwrap();

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert!(output.contains("] [WRN] [] Disk at 91\n"), "got {}", output);
    }

    #[test]
    fn test_stdout_sink() {
        let mut sink = ConsoleSink::json();
        assert!(sink.emit(&event()).is_ok());
        assert!(sink.flush().is_ok());
        assert_eq!(sink.name(), "console");
    }
}
