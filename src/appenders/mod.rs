//! Sink implementations

pub mod console;
pub mod rolling_file;

pub use console::ConsoleSink;
pub use rolling_file::{
    RollingFileSink, RollingInterval, RollingPolicy, DEFAULT_FILE_SIZE_LIMIT_BYTES,
};

pub use crate::core::Sink;
