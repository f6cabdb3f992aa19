use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Host name '{label}' is not in an expected format")]
    FormatError { label: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Remote operation '{operation}' failed with status {status}: {message}")]
    RemoteOperationError {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Batch worker failed: {message}")]
    WorkerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Format,
    Configuration,
    Remote,
    Internal,
}

impl MigrateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MigrateError::FormatError { .. } => ErrorCategory::Format,
            MigrateError::ConfigError { .. }
            | MigrateError::MissingConfigError { .. }
            | MigrateError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            MigrateError::ApiError(_) | MigrateError::RemoteOperationError { .. } => {
                ErrorCategory::Remote
            }
            MigrateError::IoError(_)
            | MigrateError::SerializationError(_)
            | MigrateError::WorkerError { .. } => ErrorCategory::Internal,
        }
    }

    /// 給操作人員看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            MigrateError::FormatError { label } => {
                format!("Cannot map host name '{}' to a tier-specific name", label)
            }
            MigrateError::ApiError(e) => format!("Could not reach the Site Factory API: {}", e),
            MigrateError::RemoteOperationError {
                operation, status, ..
            } => format!("Site Factory rejected '{}' (HTTP {})", operation, status),
            MigrateError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Format => {
                "Check the site's custom domains; only <name>, <name>-<tier>-acsf, <name>-cms and <name>-cms-<tier> labels can be migrated"
            }
            ErrorCategory::Configuration => {
                "Check the [factory] section of the configuration file and any ${VAR} references"
            }
            ErrorCategory::Remote => {
                "Check the factory host, credentials and the task list in the Site Factory console"
            }
            ErrorCategory::Internal => "Re-run with --verbose for more detail",
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_label() {
        let err = MigrateError::FormatError {
            label: "www-".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Format);
        assert!(err.to_string().contains("'www-'"));
        assert!(err.user_friendly_message().contains("www-"));
    }

    #[test]
    fn test_remote_error_category() {
        let err = MigrateError::RemoteOperationError {
            operation: "stage".to_string(),
            status: 403,
            message: "forbidden".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert!(err.user_friendly_message().contains("HTTP 403"));
    }
}
