//! # Compact Logger
//!
//! A structured logging facade that writes one compact JSON object per event.
//!
//! ## Features
//!
//! - **Caller enrichment**: every event carries `Caller`, `FilePath` and
//!   `LineNumber`, taken from the call site by the macros or from the stack
//! - **Message templates**: `"Charge failed for {OrderId}"` keeps `OrderId` as a
//!   structured property
//! - **Sinks**: stdout (JSON or human-readable) and rolling files
//! - **Configuration**: serde settings and application-settings documents
//!
//! ## Example
//!
//! ```
//! use compact_logger::prelude::*;
//! use compact_logger::warning;
//!
//! let logger = Logger::builder()
//!     .entity(EntityType::Service, "billing")
//!     .sink(ConsoleSink::json())
//!     .build();
//!
//! warning!(logger, "Charge failed for {OrderId}", 42);
//! logger.warning("Queue depth {Depth}", args![118]);
//! ```

pub mod appenders;
pub mod core;
pub mod factory;
pub mod formatters;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleSink, RollingFileSink, RollingInterval, RollingPolicy};
    pub use crate::args;
    pub use crate::core::{
        CallerInfo, ContextGuard, EntityType, LogContext, LogEvent, LogLevel, Logger,
        LoggerBuilder, LoggerError, LoggerMetrics, LoggerSettings, PropertyValue, Result, Sink,
        SinkSettings,
    };
    pub use crate::factory::{ConsoleOptions, FileOptions, LogFactory};
    pub use crate::formatters::{CompactJsonFormatter, DebugTextFormatter, TextFormatter};
}

pub use appenders::{ConsoleSink, RollingFileSink, RollingInterval, RollingPolicy};
pub use crate::core::{
    CallerInfo, CallerResolver, ContextGuard, EntityType, HostEnvironment, LogContext, LogEvent,
    LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggerSettings, MessageTemplate,
    PropertyValue, Result, Sink, SinkSettings,
};
pub use factory::{ConsoleOptions, FileOptions, LogFactory};
pub use formatters::{CompactJsonFormatter, DebugTextFormatter, JsonValueFormatter, TextFormatter};
