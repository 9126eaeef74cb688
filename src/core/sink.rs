//! Sink trait for log output destinations

use super::{error::Result, log_event::LogEvent};

pub trait Sink: Send + Sync {
    fn emit(&mut self, event: &LogEvent) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
