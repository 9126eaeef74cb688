//! Entity classification attached to every event as `EntityType`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of component emitting the logs
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    API,
    Function,
    Service,
    WebApp,
}

impl EntityType {
    pub fn to_str(&self) -> &'static str {
        match self {
            EntityType::API => "API",
            EntityType::Function => "Function",
            EntityType::Service => "Service",
            EntityType::WebApp => "WebApp",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(EntityType::API),
            "function" => Ok(EntityType::Function),
            "service" => Ok(EntityType::Service),
            "webapp" => Ok(EntityType::WebApp),
            _ => Err(format!("Invalid entity type: {}", s)),
        }
    }
}
