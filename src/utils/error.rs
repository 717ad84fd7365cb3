use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SweepError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SweepError::Network(_) => ErrorCategory::Network,
            SweepError::Decode(_) => ErrorCategory::Data,
            SweepError::Zip(_) | SweepError::Io(_) => ErrorCategory::Storage,
            SweepError::ConfigError { .. }
            | SweepError::ConfigValidationError { .. }
            | SweepError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤可以重跑
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and that the registry URL is reachable, then run again"
            }
            ErrorCategory::Data => "The registry must return a JSON array of objects with a 'domain' field",
            ErrorCategory::Storage => {
                "Check that the output directory exists and is writable, and that disk space is available"
            }
            ErrorCategory::Configuration => "Review the command line flags or the TOML configuration file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SweepError::Network(e) => format!("Could not fetch the domain list: {}", e),
            SweepError::Decode(e) => format!("Could not decode data: {}", e),
            SweepError::Zip(e) => format!("Could not build the compressed output: {}", e),
            SweepError::Io(e) => format!("Could not write the output file: {}", e),
            SweepError::ConfigError { message } => format!("Configuration problem: {}", message),
            SweepError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            SweepError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
