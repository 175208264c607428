use std::path::PathBuf;
use thiserror::Error;

/// Underlying reason a call to the remote store failed.
#[derive(Error, Debug)]
pub enum RemoteCause {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Missing required environment variable: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Path traversal detected: {} resolves outside {}", .path.display(), .root.display())]
    PathSafetyError { path: PathBuf, root: PathBuf },

    #[error("IO error while trying to {operation} {}: {source}", .path.display())]
    IoError {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error while writing {}: {source}", .path.display())]
    CsvError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Airtable {operation} on table '{table}' failed: {cause}")]
    RemoteError {
        operation: &'static str,
        table: String,
        #[source]
        cause: RemoteCause,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    PathSafety,
    FileSystem,
    Remote,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn remote(operation: &'static str, table: &str, cause: impl Into<RemoteCause>) -> Self {
        Self::RemoteError {
            operation,
            table: table.to_string(),
            cause: cause.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::PathSafetyError { .. } => ErrorCategory::PathSafety,
            Self::IoError { .. } | Self::CsvError { .. } => ErrorCategory::FileSystem,
            Self::RemoteError { .. } => ErrorCategory::Remote,
            Self::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RemoteError {
                cause: RemoteCause::Transport(_),
                ..
            } => ErrorSeverity::Medium,
            Self::RemoteError {
                cause: RemoteCause::Status { status, .. },
                ..
            } if *status == 429 || *status >= 500 => ErrorSeverity::Medium,
            Self::RemoteError { .. } | Self::SerializationError(_) => ErrorSeverity::High,
            Self::PathSafetyError { .. } => ErrorSeverity::High,
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::IoError { .. }
            | Self::CsvError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingConfigError { field } => {
                format!("Set {} in the environment before running", field)
            }
            Self::InvalidConfigValueError { field, .. } => format!("Fix the value of {}", field),
            Self::ConfigValidationError { field, .. } => {
                format!("Check the '{}' section of the manifest", field)
            }
            Self::PathSafetyError { root, .. } => format!(
                "Choose an output path inside {} without '..' segments",
                root.display()
            ),
            Self::IoError { path, .. } | Self::CsvError { path, .. } => format!(
                "Check that {} is writable and the disk is not full",
                path.display()
            ),
            Self::RemoteError {
                cause: RemoteCause::Status { status: 401, .. },
                ..
            }
            | Self::RemoteError {
                cause: RemoteCause::Status { status: 403, .. },
                ..
            } => "Verify AIRTABLE_API_KEY and its access to the base".to_string(),
            Self::RemoteError {
                cause: RemoteCause::Status { status: 404, .. },
                table,
                ..
            } => format!("Verify AIRTABLE_BASE_ID and that table '{}' exists", table),
            Self::RemoteError {
                cause: RemoteCause::Status { status: 429, .. },
                ..
            } => "Airtable rate limit hit; wait a moment and retry".to_string(),
            Self::RemoteError { .. } => "Check network connectivity and retry".to_string(),
            Self::SerializationError(_) => "Pass fields as a JSON object".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::PathSafety => format!("Refusing to write: {}", self),
            ErrorCategory::FileSystem => format!("Could not write output: {}", self),
            ErrorCategory::Remote => format!("Airtable request failed: {}", self),
            ErrorCategory::Data => format!("Invalid input: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_names_variable() {
        let err = ExportError::MissingConfigError {
            field: "AIRTABLE_BASE_ID".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: AIRTABLE_BASE_ID"
        );
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_remote_error_carries_table_and_cause() {
        let err = ExportError::remote(
            "list",
            "Tasks",
            RemoteCause::Status {
                status: 404,
                message: "NOT_FOUND".to_string(),
            },
        );
        let text = err.to_string();
        assert!(text.contains("Tasks"));
        assert!(text.contains("404"));
        assert!(err.recovery_suggestion().contains("Tasks"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_rate_limit_is_retryable_severity() {
        let err = ExportError::remote(
            "create",
            "Tasks",
            RemoteCause::Status {
                status: 429,
                message: "RATE_LIMIT".to_string(),
            },
        );
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_io_error_keeps_operation_and_path() {
        let err = ExportError::io(
            "create directory",
            "/tmp/out",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let text = err.to_string();
        assert!(text.contains("create directory"));
        assert!(text.contains("/tmp/out"));
        assert_eq!(err.category(), ErrorCategory::FileSystem);
    }
}
