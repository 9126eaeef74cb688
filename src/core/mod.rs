//! Core logger types and traits

pub mod caller;
pub mod entity;
pub mod error;
pub mod log_context;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod message_template;
pub mod metrics;
pub mod property_value;
pub mod settings;
pub mod sink;
pub mod timestamp;

pub use caller::{CallerInfo, CallerResolver, DEFAULT_FRAME_INDEX};
pub use entity::EntityType;
pub use error::{LoggerError, Result};
pub use log_context::{ContextGuard, LogContext};
pub use log_event::{describe_error, LogEvent};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use message_template::{MessageTemplate, TemplateCache};
pub use metrics::LoggerMetrics;
pub use property_value::{Properties, PropertyValue, StructureValue};
pub use settings::{HostEnvironment, LoggerSettings, SinkSettings};
pub use sink::Sink;
