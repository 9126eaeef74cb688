//! Ready-made console and file loggers
//!
//! ```no_run
//! use compact_logger::factory::{ConsoleOptions, FileOptions, LogFactory};
//! use compact_logger::EntityType;
//!
//! let console = LogFactory::console(EntityType::Service, "billing", ConsoleOptions::default());
//! let file = LogFactory::file(
//!     EntityType::Service,
//!     "billing",
//!     "logs/billing.log",
//!     FileOptions::default(),
//! )
//! .unwrap();
//! ```

use crate::appenders::{
    ConsoleSink, RollingFileSink, RollingInterval, RollingPolicy, DEFAULT_FILE_SIZE_LIMIT_BYTES,
};
use crate::core::settings::executable_name;
use crate::core::{
    EntityType, LogLevel, Logger, LoggerBuilder, LoggerError, Result, DEFAULT_FRAME_INDEX,
};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub level: LogLevel,
    /// Human-readable output instead of compact JSON
    pub debug_console: bool,
    pub frame_index: usize,
    /// `ApplicationName` on every event; defaults to the executable name
    pub application_name: Option<String>,
    pub application_version: Option<String>,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            level: LogLevel::Warning,
            debug_console: false,
            frame_index: DEFAULT_FRAME_INDEX,
            application_name: executable_name(),
            application_version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    pub level: LogLevel,
    pub rolling_interval: RollingInterval,
    pub file_size_limit_bytes: u64,
    pub frame_index: usize,
    pub shared: bool,
    /// `ApplicationName` on every event; defaults to the executable name
    pub application_name: Option<String>,
    pub application_version: Option<String>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            level: LogLevel::Warning,
            rolling_interval: RollingInterval::Day,
            file_size_limit_bytes: DEFAULT_FILE_SIZE_LIMIT_BYTES,
            frame_index: DEFAULT_FRAME_INDEX,
            shared: true,
            application_name: executable_name(),
            application_version: None,
        }
    }
}

pub struct LogFactory;

impl LogFactory {
    /// Logger writing to stdout
    pub fn console(entity_type: EntityType, entity_name: &str, options: ConsoleOptions) -> Logger {
        let sink = if options.debug_console {
            ConsoleSink::debug(true)
        } else {
            ConsoleSink::json()
        };

        let builder = Logger::builder()
            .min_level(options.level)
            .frame_index(options.frame_index)
            .entity(entity_type, entity_name)
            .sink(sink);
        with_application(builder, options.application_name, options.application_version).build()
    }

    /// Logger writing compact JSON to rolling files
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty entity name, an empty path or a zero
    /// size limit.
    pub fn file<P: AsRef<Path>>(
        entity_type: EntityType,
        entity_name: &str,
        path: P,
        options: FileOptions,
    ) -> Result<Logger> {
        if entity_name.trim().is_empty() {
            return Err(LoggerError::invalid_argument("entity_name", "must not be empty"));
        }

        let policy = RollingPolicy::new()
            .with_interval(options.rolling_interval)
            .with_size_limit(Some(options.file_size_limit_bytes))
            .with_shared(options.shared);
        let sink = RollingFileSink::with_policy(path, policy)?;

        let builder = Logger::builder()
            .min_level(options.level)
            .frame_index(options.frame_index)
            .entity(entity_type, entity_name)
            .sink(sink);
        Ok(with_application(builder, options.application_name, options.application_version).build())
    }
}

fn with_application(
    builder: LoggerBuilder,
    name: Option<String>,
    version: Option<String>,
) -> LoggerBuilder {
    match name {
        Some(name) => builder.application(name, version.as_deref()),
        None => builder,
    }
}
