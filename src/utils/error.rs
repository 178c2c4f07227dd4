use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("XML error: {message}")]
    XmlError { message: String },

    #[error("Missing required column or data for: {field}.")]
    MissingRequiredColumn { field: String },

    #[error("Failed to connect to patient service: {message}")]
    ConnectionError { message: String },

    #[error("Failed to build request header: {message}")]
    RequestHeaderError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntakeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IntakeError::CsvError(_) | IntakeError::MissingRequiredColumn { .. } => {
                ErrorCategory::Input
            }
            IntakeError::ApiError(_)
            | IntakeError::XmlError { .. }
            | IntakeError::ConnectionError { .. } => ErrorCategory::Network,
            IntakeError::RequestHeaderError { .. }
            | IntakeError::ConfigError { .. }
            | IntakeError::ConfigValidationError { .. }
            | IntakeError::InvalidConfigValueError { .. }
            | IntakeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            IntakeError::IoError(_) | IntakeError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IntakeError::MissingRequiredColumn { field } => {
                format!("Missing required column or data for: {}.", field)
            }
            IntakeError::CsvError(e) => format!("Error reading spreadsheet: {}", e),
            IntakeError::ConnectionError { .. } => {
                "Failed to connect to the patient service.".to_string()
            }
            IntakeError::RequestHeaderError { .. } => {
                "Failed to build the patient service request header.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            IntakeError::MissingRequiredColumn { .. } => {
                "Add the column (or one of its accepted header names) and fill in at least one row"
            }
            IntakeError::CsvError(_) => "Check that the input file is a valid CSV export",
            IntakeError::ApiError(_) | IntakeError::ConnectionError { .. } => {
                "Check the WSDL URL and network connectivity"
            }
            IntakeError::XmlError { .. } => "Check that the WSDL URL points to a SOAP service",
            IntakeError::RequestHeaderError { .. } => {
                "Check the customer key, user and password"
            }
            IntakeError::ConfigError { .. }
            | IntakeError::ConfigValidationError { .. }
            | IntakeError::InvalidConfigValueError { .. }
            | IntakeError::MissingConfigError { .. } => "Review the configuration values",
            IntakeError::IoError(_) => "Check file paths and permissions",
            IntakeError::SerializationError(_) => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_names_field() {
        let err = IntakeError::MissingRequiredColumn {
            field: "DOB".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required column or data for: DOB.");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_connection_error_is_network() {
        let err = IntakeError::ConnectionError {
            message: "refused".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(
            err.user_friendly_message(),
            "Failed to connect to the patient service."
        );
    }
}
