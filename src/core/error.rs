//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A required argument was missing or out of range
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// Rolling to a new file failed
    #[error("File roll failed for '{path}': {message}")]
    FileRollError { path: String, message: String },

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file roll error
    pub fn file_roll(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRollError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
