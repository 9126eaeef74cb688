//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event, ordered from `Verbose` (lowest) to `Fatal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Verbose = 0,
    Debug = 1,
    Information = 2,
    #[default]
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "Verbose",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
        }
    }

    /// Three letter code used by the debug console (`VRB`, `DBG`, ...)
    pub fn short_code(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "VRB",
            LogLevel::Debug => "DBG",
            LogLevel::Information => "INF",
            LogLevel::Warning => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::Fatal => "FTL",
        }
    }

    /// Look up a level by its numeric value
    pub fn from_u8(value: u8) -> Option<Self> {
        LogLevel::ALL.get(usize::from(value)).copied()
    }

    /// Parse a level the forgiving way configuration files are read.
    ///
    /// Accepts `trace`/`verbose`, `debug`, `info`/`information`,
    /// `warn`/`warning` and `fatal` in any case; everything else is `Error`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "trace" | "verbose" => LogLevel::Verbose,
            "debug" => LogLevel::Debug,
            "info" | "information" => LogLevel::Information,
            "warn" | "warning" => LogLevel::Warning,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Error,
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Verbose => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Information => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbose" | "trace" => Ok(LogLevel::Verbose),
            "debug" => Ok(LogLevel::Debug),
            "information" | "info" => Ok(LogLevel::Information),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Verbose < LogLevel::Debug);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(LogLevel::parse_lenient("TRACE"), LogLevel::Verbose);
        assert_eq!(LogLevel::parse_lenient("info"), LogLevel::Information);
        assert_eq!(LogLevel::parse_lenient("Warn"), LogLevel::Warning);
        assert_eq!(LogLevel::parse_lenient("fatal"), LogLevel::Fatal);
        assert_eq!(LogLevel::parse_lenient("loud"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient(""), LogLevel::Error);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!("Information".parse::<LogLevel>(), Ok(LogLevel::Information));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(LogLevel::from_u8(0), Some(LogLevel::Verbose));
        assert_eq!(LogLevel::from_u8(5), Some(LogLevel::Fatal));
        assert_eq!(LogLevel::from_u8(6), None);
    }
}
