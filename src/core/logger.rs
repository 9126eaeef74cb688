//! Main logger implementation

use super::{
    caller::{CallerInfo, CallerResolver, DEFAULT_FRAME_INDEX},
    entity::EntityType,
    error::Result,
    log_context::LogContext,
    log_event::LogEvent,
    log_level::LogLevel,
    message_template::TemplateCache,
    metrics::LoggerMetrics,
    property_value::{Properties, PropertyValue},
    sink::Sink,
};
use parking_lot::RwLock;
use std::error::Error;
use std::sync::Arc;

pub const CALLER_PROPERTY: &str = "Caller";
pub const FILE_PATH_PROPERTY: &str = "FilePath";
pub const LINE_NUMBER_PROPERTY: &str = "LineNumber";
pub const ENTITY_TYPE_PROPERTY: &str = "EntityType";
pub const ENTITY_NAME_PROPERTY: &str = "EntityName";
pub const APPLICATION_NAME_PROPERTY: &str = "ApplicationName";
pub const APPLICATION_VERSION_PROPERTY: &str = "ApplicationVersion";

/// Stack walk for the plain logging methods.
///
/// Expands in place so the resolver sees the same frame depth from every
/// public entry point.
macro_rules! resolve_caller {
    ($logger:expr) => {{
        $logger.metrics.record_caller_lookup();
        $logger.resolver.resolve()
    }};
}

macro_rules! level_methods {
    ($($level:ident => $name:ident, $name_with_error:ident;)*) => {
        $(
            #[doc = concat!("Write a `", stringify!($level), "` event, resolving the caller from the stack")]
            #[inline(never)]
            pub fn $name(&self, template: &str, args: impl IntoIterator<Item = PropertyValue>) {
                if !self.is_enabled(LogLevel::$level) {
                    return;
                }
                let caller = resolve_caller!(self);
                self.write(LogLevel::$level, caller, None, template, args);
            }

            #[doc = concat!("Write a `", stringify!($level), "` event with an attached error")]
            #[inline(never)]
            pub fn $name_with_error(
                &self,
                error: &(dyn Error + 'static),
                template: &str,
                args: impl IntoIterator<Item = PropertyValue>,
            ) {
                if !self.is_enabled(LogLevel::$level) {
                    return;
                }
                let caller = resolve_caller!(self);
                self.write(LogLevel::$level, caller, Some(error), template, args);
            }
        )*
    };
}

/// Structured logger.
///
/// The minimum level, caller resolver and enrichment properties are fixed when
/// the logger is built. Every event goes to every sink; a failing sink does not
/// keep the others from receiving it.
pub struct Logger {
    min_level: LogLevel,
    resolver: CallerResolver,
    /// Added to every event where absent
    enrichment: Properties,
    sinks: Arc<RwLock<Vec<Box<dyn Sink>>>>,
    metrics: Arc<LoggerMetrics>,
    templates: Arc<TemplateCache>,
}

impl Logger {
    /// Create a logger with no sinks at the default `Warning` level
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::default(),
            resolver: CallerResolver::default(),
            enrichment: Properties::new(),
            sinks: Arc::new(RwLock::new(Vec::new())),
            metrics: Arc::new(LoggerMetrics::new()),
            templates: Arc::new(TemplateCache::new()),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use compact_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .entity(EntityType::Service, "billing")
    ///     .build();
    /// assert!(logger.is_enabled(LogLevel::Information));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        let mut sinks = self.sinks.write();
        sinks.push(sink);
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn frame_index(&self) -> usize {
        self.resolver.frame_index()
    }

    /// Properties added to every event
    pub fn enrichment(&self) -> &Properties {
        &self.enrichment
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Write an event at `level`, resolving the caller from the stack
    #[inline(never)]
    pub fn log(&self, level: LogLevel, template: &str, args: impl IntoIterator<Item = PropertyValue>) {
        if !self.is_enabled(level) {
            return;
        }
        let caller = resolve_caller!(self);
        self.write(level, caller, None, template, args);
    }

    /// Write an event at `level` with an attached error
    #[inline(never)]
    pub fn log_error(
        &self,
        level: LogLevel,
        error: &(dyn Error + 'static),
        template: &str,
        args: impl IntoIterator<Item = PropertyValue>,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let caller = resolve_caller!(self);
        self.write(level, caller, Some(error), template, args);
    }

    /// Write an event with caller info supplied by the call site.
    ///
    /// No stack walk is performed; this is what the logging macros use.
    pub fn log_with_caller(
        &self,
        level: LogLevel,
        caller: CallerInfo,
        error: Option<&(dyn Error + 'static)>,
        template: &str,
        args: impl IntoIterator<Item = PropertyValue>,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        self.write(level, caller, error, template, args);
    }

    level_methods! {
        Verbose => verbose, verbose_with_error;
        Debug => debug, debug_with_error;
        Information => information, information_with_error;
        Warning => warning, warning_with_error;
        Error => error, error_with_error;
        Fatal => fatal, fatal_with_error;
    }

    fn write(
        &self,
        level: LogLevel,
        caller: CallerInfo,
        error: Option<&(dyn Error + 'static)>,
        template: &str,
        args: impl IntoIterator<Item = PropertyValue>,
    ) {
        let _caller_scope = LogContext::push_properties([
            (CALLER_PROPERTY.to_string(), PropertyValue::String(caller.caller)),
            (FILE_PATH_PROPERTY.to_string(), PropertyValue::String(caller.file_name)),
            (LINE_NUMBER_PROPERTY.to_string(), PropertyValue::String(caller.line_number)),
        ]);

        let mut event = LogEvent::new(level, self.templates.parse(template), args);
        LogContext::enrich(&mut event.properties);
        for (name, value) in &self.enrichment {
            event
                .properties
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        if let Some(error) = error {
            event = event.with_error(error);
        }

        let mut sinks = self.sinks.write();
        Self::process_sync(&mut sinks, &event, &self.metrics);
    }

    /// Hand the event to every sink with per-sink panic isolation
    fn process_sync(
        sinks: &mut Vec<Box<dyn Sink>>,
        event: &LogEvent,
        metrics: &Arc<LoggerMetrics>,
    ) -> bool {
        let mut has_error = false;

        for (idx, sink) in sinks.iter_mut().enumerate() {
            let emit_result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.emit(event)));

            match emit_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink #{} ({}) failed: {}", idx, sink.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Sink #{} ({}) panicked: {}. \
                         Other sinks continue to function.",
                        idx,
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }

        has_error
    }

    /// Get the number of events at least one sink failed to write
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Get the logger metrics
    ///
    /// # Example
    ///
    /// ```
    /// use compact_logger::prelude::*;
    ///
    /// let logger = Logger::builder().min_level(LogLevel::Error).build();
    /// logger.information("not written", args![]);
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.total_logged(), 0);
    /// assert_eq!(metrics.caller_lookups(), 0);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        let mut sinks = self.sinks.write();
        for sink in sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped events (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use compact_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Information)
///     .entity(EntityType::API, "orders")
///     .application("orders-api", Some("1.4.0"))
///     .sink(ConsoleSink::json())
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    frame_index: usize,
    properties: Properties,
    sinks: Vec<Box<dyn Sink>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::default(),
            frame_index: DEFAULT_FRAME_INDEX,
            properties: Properties::new(),
            sinks: Vec::new(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the stack depth used to resolve callers
    #[must_use = "builder methods return a new value"]
    pub fn frame_index(mut self, frame_index: usize) -> Self {
        self.frame_index = frame_index;
        self
    }

    /// Tag every event with `EntityType` and `EntityName`
    #[must_use = "builder methods return a new value"]
    pub fn entity(self, entity_type: EntityType, entity_name: impl Into<String>) -> Self {
        self.property(ENTITY_TYPE_PROPERTY, entity_type.to_str())
            .property(ENTITY_NAME_PROPERTY, entity_name.into())
    }

    /// Tag every event with `ApplicationName` and, if given, `ApplicationVersion`
    #[must_use = "builder methods return a new value"]
    pub fn application(self, name: impl Into<String>, version: Option<&str>) -> Self {
        let builder = self.property(APPLICATION_NAME_PROPERTY, name.into());
        match version {
            Some(version) => builder.property(APPLICATION_VERSION_PROPERTY, version),
            None => builder,
        }
    }

    /// Add a property to every event; a later call with the same name wins
    #[must_use = "builder methods return a new value"]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let mut logger = Logger::new();
        logger.min_level = self.min_level;
        logger.resolver = CallerResolver::new(self.frame_index);
        logger.enrichment = self.properties;
        for sink in self.sinks {
            logger.add_sink(sink);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
