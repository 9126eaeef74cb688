//! Logging macros with call-site caller info.
//!
//! The macros take the file, line and enclosing function from the call site,
//! so no stack walk is needed. Template arguments follow the template and are
//! converted with `PropertyValue::from`.
//!
//! # Examples
//!
//! ```
//! use compact_logger::prelude::*;
//! use compact_logger::{error, information, warning};
//!
//! let logger = Logger::builder().min_level(LogLevel::Information).build();
//!
//! information!(logger, "Server started");
//! warning!(logger, "Retry {Attempt} of {Max}", 1, 3);
//!
//! let failure = std::io::Error::new(std::io::ErrorKind::Other, "declined");
//! error!(logger, err = &failure; "Charge failed for {OrderId}", 42);
//! ```

/// Build the argument list for a template.
///
/// ```
/// use compact_logger::args;
/// use compact_logger::core::PropertyValue;
///
/// let values = args![42, "billing", true];
/// assert_eq!(values[1], PropertyValue::from("billing"));
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::core::PropertyValue>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::core::PropertyValue::from($arg)),+]
    };
}

#[doc(hidden)]
pub fn __type_name_of<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}

/// Caller info for the current call site
///
/// ```
/// use compact_logger::caller;
///
/// fn handle_request() -> compact_logger::core::CallerInfo {
///     caller!()
/// }
///
/// let info = handle_request();
/// assert!(info.caller.ends_with("handle_request()"));
/// assert!(!info.line_number.is_empty());
/// ```
#[macro_export]
macro_rules! caller {
    () => {{
        fn __here() {}
        let name = $crate::macros::__type_name_of(&__here);
        let function = name.strip_suffix("::__here").unwrap_or(name);
        $crate::core::CallerInfo::from_location(file!(), line!(), function)
    }};
}

/// Log at an explicit level.
///
/// ```
/// # use compact_logger::prelude::*;
/// # let logger = Logger::new();
/// use compact_logger::log;
/// log!(logger, LogLevel::Warning, "Simple message");
/// log!(logger, LogLevel::Error, "Status code {Code}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, err = $error:expr; $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log_with_caller(
                level,
                $crate::caller!(),
                Some($error as &(dyn ::std::error::Error + 'static)),
                $template,
                $crate::args![$($arg),*],
            );
        }
    }};
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log_with_caller(level, $crate::caller!(), None, $template, $crate::args![$($arg),*]);
        }
    }};
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Verbose, $($rest)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! information {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Information, $($rest)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($rest)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogEvent, LogLevel, Logger, PropertyValue, Result, Sink};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CaptureSink(Arc<Mutex<Vec<LogEvent>>>);

    impl Sink for CaptureSink {
        fn emit(&mut self, event: &LogEvent) -> Result<()> {
            self.0.lock().push(event.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn logger(level: LogLevel) -> (Logger, CaptureSink) {
        let sink = CaptureSink::default();
        (Logger::builder().min_level(level).sink(sink.clone()).build(), sink)
    }

    fn property(event: &LogEvent, name: &str) -> String {
        event.properties.get(name).map(PropertyValue::to_plain_string).unwrap_or_default()
    }

    #[test]
    fn test_caller_macro_uses_enclosing_function() {
        let info = caller!();
        assert_eq!(info.file_name, file!());
        assert!(info.caller.ends_with("tests.test_caller_macro_uses_enclosing_function()"));

        let from_closure = (|| caller!())();
        assert!(from_closure.caller.ends_with("test_caller_macro_uses_enclosing_function()"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, sink) = logger(LogLevel::Verbose);

        verbose!(logger, "v");
        debug!(logger, "d {A}", 1);
        information!(logger, "i {A} {B}", 1, "two");
        warning!(logger, "w");
        error!(logger, "e");
        fatal!(logger, "f",);

        let events = sink.0.lock();
        let levels: Vec<LogLevel> = events.iter().map(|event| event.level).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
        assert_eq!(events[2].render_message(), "i 1 \"two\"");
        assert_eq!(logger.metrics().caller_lookups(), 0);
    }

    #[test]
    fn test_macro_caller_properties() {
        let (logger, sink) = logger(LogLevel::Warning);

        let line = line!() + 1;
        warning!(logger, "Charge failed for {OrderId}", 42);

        let events = sink.0.lock();
        assert_eq!(property(&events[0], "FilePath"), file!());
        assert_eq!(property(&events[0], "LineNumber"), line.to_string());
        assert!(property(&events[0], "Caller").ends_with("test_macro_caller_properties()"));
    }

    #[test]
    fn test_error_argument() {
        let (logger, sink) = logger(LogLevel::Warning);
        let failure = std::io::Error::new(std::io::ErrorKind::Other, "declined");

        error!(logger, err = &failure; "Charge failed for {OrderId}", 42);
        log!(logger, LogLevel::Fatal, err = &failure; "Shutting down");

        let events = sink.0.lock();
        assert_eq!(events[0].exception.as_deref(), Some("declined"));
        assert_eq!(events[1].level, LogLevel::Fatal);
    }

    #[test]
    fn test_below_threshold_skips_everything() {
        let (logger, sink) = logger(LogLevel::Error);

        information!(logger, "hidden {A}", 1);
        warning!(logger, "hidden");

        assert!(sink.0.lock().is_empty());
        assert_eq!(logger.metrics().total_logged(), 0);
    }
}
