//! Serializable logger configuration
//!
//! Settings can be written by hand, deserialized from JSON, or read from an
//! application-settings document with [`LoggerSettings::from_app_config`].

use super::{
    caller::DEFAULT_FRAME_INDEX,
    entity::EntityType,
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::Logger,
    sink::Sink,
};
use crate::appenders::{
    ConsoleSink, RollingFileSink, RollingInterval, RollingPolicy, DEFAULT_FILE_SIZE_LIMIT_BYTES,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Where events are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SinkSettings {
    /// stdout; compact JSON, or the human-readable format when `debug` is set
    Console {
        #[serde(default)]
        debug: bool,
    },
    #[serde(rename_all = "camelCase")]
    File {
        path: PathBuf,
        #[serde(default)]
        rolling_interval: RollingInterval,
        /// `null` disables size-based rolling
        #[serde(default = "default_file_size_limit")]
        file_size_limit_bytes: Option<u64>,
        #[serde(default)]
        shared: bool,
    },
}

impl Default for SinkSettings {
    fn default() -> Self {
        SinkSettings::Console { debug: false }
    }
}

impl SinkSettings {
    fn build(&self) -> Result<Box<dyn Sink>> {
        match self {
            SinkSettings::Console { debug: true } => Ok(Box::new(ConsoleSink::debug(true))),
            SinkSettings::Console { debug: false } => Ok(Box::new(ConsoleSink::json())),
            SinkSettings::File {
                path,
                rolling_interval,
                file_size_limit_bytes,
                shared,
            } => {
                let policy = RollingPolicy::new()
                    .with_interval(*rolling_interval)
                    .with_size_limit(*file_size_limit_bytes)
                    .with_shared(*shared);
                Ok(Box::new(RollingFileSink::with_policy(path, policy)?))
            }
        }
    }
}

/// Hosting environment, deciding the console format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostEnvironment {
    Development,
    Staging,
    #[default]
    Production,
}

impl HostEnvironment {
    /// Case-insensitive; anything unrecognized is `Production`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "development" => HostEnvironment::Development,
            "staging" => HostEnvironment::Staging,
            _ => HostEnvironment::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, HostEnvironment::Development)
    }
}

/// Complete logger configuration
///
/// # Example
///
/// ```
/// use compact_logger::core::{LoggerSettings, SinkSettings};
/// use compact_logger::LogLevel;
///
/// let settings: LoggerSettings = serde_json::from_str(r#"{
///     "entityType": "Service",
///     "entityName": "billing",
///     "minimumLevel": "info",
///     "sink": { "kind": "console", "debug": false }
/// }"#).unwrap();
///
/// assert_eq!(settings.minimum_level, LogLevel::Information);
/// assert_eq!(settings.frame_index, 3);
/// assert_eq!(settings.sink, SinkSettings::Console { debug: false });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerSettings {
    pub entity_type: EntityType,
    pub entity_name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_level")]
    pub minimum_level: LogLevel,
    #[serde(default = "default_frame_index")]
    pub frame_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_version: Option<String>,
    #[serde(default)]
    pub sink: SinkSettings,
}

/// File stem of the running executable, the default `ApplicationName`
pub fn executable_name() -> Option<String> {
    let path = std::env::current_exe().ok()?;
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

fn default_frame_index() -> usize {
    DEFAULT_FRAME_INDEX
}

fn default_file_size_limit() -> Option<u64> {
    Some(DEFAULT_FILE_SIZE_LIMIT_BYTES)
}

fn deserialize_lenient_level<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(LogLevel::parse_lenient(&name))
}

impl LoggerSettings {
    pub fn new(entity_type: EntityType, entity_name: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_name: entity_name.into(),
            minimum_level: LogLevel::default(),
            frame_index: DEFAULT_FRAME_INDEX,
            application_name: None,
            application_version: None,
            sink: SinkSettings::default(),
        }
    }

    /// Read settings from an application-settings JSON document.
    ///
    /// Uses `Application.EntityName` and `Logging.LogLevel.<entity type>`. A
    /// missing level means `Verbose`. `Application.Name` and
    /// `Application.Version` tag every event; the name defaults to the
    /// executable name. The development environment gets the
    /// human-readable console, every other environment the JSON console.
    ///
    /// # Errors
    ///
    /// `JsonError` for malformed JSON, `InvalidConfiguration` when the entity
    /// name is missing or the level is not a level name.
    pub fn from_app_config(
        json: &str,
        entity_type: EntityType,
        environment: HostEnvironment,
    ) -> Result<Self> {
        let document: serde_json::Value = serde_json::from_str(json)?;

        let entity_name = document
            .pointer("/Application/EntityName")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| LoggerError::config("Application", "EntityName is required"))?;

        let level_pointer = format!("/Logging/LogLevel/{}", entity_type);
        let minimum_level = match document.pointer(&level_pointer) {
            None | Some(serde_json::Value::Null) => LogLevel::Verbose,
            Some(serde_json::Value::String(name)) => name.parse().map_err(|e: String| {
                LoggerError::config(format!("Logging:LogLevel:{}", entity_type), e)
            })?,
            Some(other) => {
                return Err(LoggerError::config(
                    format!("Logging:LogLevel:{}", entity_type),
                    format!("Expected a level name, found {}", other),
                ))
            }
        };

        let application_value = |key: &str| {
            document
                .pointer(&format!("/Application/{}", key))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        let mut settings = Self::new(entity_type, entity_name);
        settings.minimum_level = minimum_level;
        settings.application_name = application_value("Name").or_else(executable_name);
        settings.application_version = application_value("Version");
        settings.sink = SinkSettings::Console {
            debug: environment.is_development(),
        };
        Ok(settings)
    }

    /// Validate and create the logger
    pub fn build(&self) -> Result<Logger> {
        if self.entity_name.trim().is_empty() {
            return Err(LoggerError::invalid_argument("entity_name", "must not be empty"));
        }

        let mut builder = Logger::builder()
            .min_level(self.minimum_level)
            .frame_index(self.frame_index)
            .entity(self.entity_type, self.entity_name.as_str())
            .boxed_sink(self.sink.build()?);
        if let Some(ref name) = self.application_name {
            builder = builder.application(name.as_str(), self.application_version.as_deref());
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const APP_CONFIG: &str = r#"{
        "Application": { "EntityName": "orders" },
        "Logging": { "LogLevel": { "Default": "Warning", "API": "Information" } }
    }"#;

    #[test]
    fn test_from_app_config() {
        let settings =
            LoggerSettings::from_app_config(APP_CONFIG, EntityType::API, HostEnvironment::Production)
                .unwrap();
        assert_eq!(settings.entity_name, "orders");
        assert_eq!(settings.minimum_level, LogLevel::Information);
        assert_eq!(settings.sink, SinkSettings::Console { debug: false });
    }

    #[test]
    fn test_from_app_config_application_details() {
        let settings =
            LoggerSettings::from_app_config(APP_CONFIG, EntityType::API, HostEnvironment::Production)
                .unwrap();
        assert_eq!(settings.application_name, executable_name());
        assert_eq!(settings.application_version, None);

        let config = r#"{
            "Application": { "EntityName": "orders", "Name": "orders-api", "Version": "4.1.0" }
        }"#;
        let settings =
            LoggerSettings::from_app_config(config, EntityType::API, HostEnvironment::Development)
                .unwrap();
        assert_eq!(settings.application_name.as_deref(), Some("orders-api"));
        assert_eq!(settings.application_version.as_deref(), Some("4.1.0"));

        let logger = settings.build().unwrap();
        assert_eq!(
            logger.enrichment().get("ApplicationName"),
            Some(&crate::core::PropertyValue::from("orders-api"))
        );
        assert_eq!(
            logger.enrichment().get("ApplicationVersion"),
            Some(&crate::core::PropertyValue::from("4.1.0"))
        );
    }

    #[test]
    fn test_from_app_config_development_and_missing_level() {
        let settings = LoggerSettings::from_app_config(
            APP_CONFIG,
            EntityType::Function,
            HostEnvironment::from_name("Development"),
        )
        .unwrap();
        assert_eq!(settings.minimum_level, LogLevel::Verbose);
        assert_eq!(settings.sink, SinkSettings::Console { debug: true });
    }

    #[test]
    fn test_from_app_config_errors() {
        let bad_level = r#"{"Application":{"EntityName":"x"},"Logging":{"LogLevel":{"API":"Loud"}}}"#;
        assert!(matches!(
            LoggerSettings::from_app_config(bad_level, EntityType::API, HostEnvironment::Production),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        let no_name = r#"{"Logging":{}}"#;
        assert!(matches!(
            LoggerSettings::from_app_config(no_name, EntityType::API, HostEnvironment::Production),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        assert!(matches!(
            LoggerSettings::from_app_config("{", EntityType::API, HostEnvironment::Production),
            Err(LoggerError::JsonError(_))
        ));
    }

    #[test]
    fn test_lenient_level_in_settings() {
        let settings: LoggerSettings = serde_json::from_str(
            r#"{"entityType":"WebApp","entityName":"site","minimumLevel":"nonsense"}"#,
        )
        .unwrap();
        assert_eq!(settings.minimum_level, LogLevel::Error);
        assert_eq!(settings.sink, SinkSettings::Console { debug: false });
    }

    #[test]
    fn test_file_sink_settings_defaults() {
        let settings: LoggerSettings = serde_json::from_str(
            r#"{"entityType":"Service","entityName":"worker",
                "sink":{"kind":"file","path":"logs/worker.log"}}"#,
        )
        .unwrap();
        assert_eq!(settings.minimum_level, LogLevel::Warning);
        assert_eq!(
            settings.sink,
            SinkSettings::File {
                path: PathBuf::from("logs/worker.log"),
                rolling_interval: RollingInterval::Day,
                file_size_limit_bytes: Some(128_000_000),
                shared: false,
            }
        );
    }

    #[test]
    fn test_build_file_logger() {
        let dir = tempdir().unwrap();
        let mut settings = LoggerSettings::new(EntityType::Service, "worker");
        settings.minimum_level = LogLevel::Information;
        settings.application_name = Some("worker-app".to_string());
        settings.sink = SinkSettings::File {
            path: dir.path().join("worker.log"),
            rolling_interval: RollingInterval::Infinite,
            file_size_limit_bytes: None,
            shared: false,
        };

        let logger = settings.build().unwrap();
        logger.information("Started", crate::args![]);
        logger.flush().unwrap();

        let content = std::fs::read_to_string(dir.path().join("worker.log")).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(line["Metadata"]["EntityType"], "Service");
        assert_eq!(line["Metadata"]["EntityName"], "worker");
        assert_eq!(line["Metadata"]["ApplicationName"], "worker-app");
    }

    #[test]
    fn test_build_rejects_empty_name_and_zero_limit() {
        let settings = LoggerSettings::new(EntityType::API, " ");
        assert!(matches!(settings.build(), Err(LoggerError::InvalidArgument { .. })));

        let dir = tempdir().unwrap();
        let mut settings = LoggerSettings::new(EntityType::API, "api");
        settings.sink = SinkSettings::File {
            path: dir.path().join("api.log"),
            rolling_interval: RollingInterval::Day,
            file_size_limit_bytes: Some(0),
            shared: false,
        };
        assert!(matches!(settings.build(), Err(LoggerError::InvalidArgument { .. })));
    }
}
