//! Application settings example
//!
//! Demonstrates building a logger from an application-settings document and
//! from serialized settings.
//!
//! Run with: cargo run --example app_config

use compact_logger::core::{HostEnvironment, SinkSettings};
use compact_logger::prelude::*;
use compact_logger::warning;

const APP_SETTINGS: &str = r#"{
    "Application": { "EntityName": "orders-api" },
    "Logging": {
        "LogLevel": { "API": "Information", "Service": "Warning" }
    }
}"#;

fn main() -> Result<()> {
    println!("=== Compact Logger - App Config Example ===\n");

    let environment = HostEnvironment::from_name(
        &std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "Production".to_string()),
    );

    println!("1. From application settings ({:?}):", environment);
    let settings = LoggerSettings::from_app_config(APP_SETTINGS, EntityType::API, environment)?;
    let logger = settings.build()?;
    logger.information("Listening on {Address}", args!["0.0.0.0:8080"]);

    println!("\n2. From serialized settings:");
    let mut settings = LoggerSettings::new(EntityType::Service, "orders-worker");
    settings.application_name = Some("orders".to_string());
    settings.sink = SinkSettings::Console { debug: false };
    let json = serde_json::to_string_pretty(&settings)?;
    println!("{}", json);

    let restored: LoggerSettings = serde_json::from_str(&json)?;
    let worker = restored.build()?;
    warning!(worker, "Retrying message {MessageId}", "m-981");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
