use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Browser automation failed: {message}")]
    BrowserError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to parse {page}: {message}")]
    ParseError { page: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Required artifact missing: {path}")]
    ArtifactMissing { path: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// 錯誤分類，用於日誌與退出碼判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Browser,
    Configuration,
    Data,
    Storage,
    Artifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 對應 CLI 的退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 可重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 產出物缺失
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::BrowserError { .. } => ErrorCategory::Browser,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ParseError { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ArtifactMissing { .. } => ErrorCategory::Artifact,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } | EtlError::BrowserError { .. } => {
                ErrorSeverity::Medium
            }
            EtlError::ValidationError { .. } => ErrorSeverity::Low,
            EtlError::ArtifactMissing { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 只有暫時性的網路錯誤值得重試
    pub fn is_retryable(&self) -> bool {
        match self {
            EtlError::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            EtlError::HttpStatusError { status, .. } => *status == 429 || *status >= 500,
            EtlError::BrowserError { .. } => true,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and whether the source site is reachable; the next scheduled run will retry"
            }
            ErrorCategory::Browser => {
                "Make sure Chrome/Chromium is installed and launchable in headless mode, or switch fetch.mode to \"http\""
            }
            ErrorCategory::Configuration => {
                "Review the TOML configuration file and command line flags"
            }
            ErrorCategory::Data => {
                "The source page layout may have changed; review the selectors and column indexes in the configuration"
            }
            ErrorCategory::Storage => {
                "Check that the archive directory exists and is writable"
            }
            ErrorCategory::Artifact => {
                "The report was not written; inspect the logs of the page generation step"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::HttpStatusError { url, status } => {
                format!("The source at {} answered with HTTP {}", url, status)
            }
            EtlError::ArtifactMissing { path } => {
                format!("The generated report {} does not exist", path)
            }
            EtlError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let missing = EtlError::ArtifactMissing {
            path: "index.html".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Artifact);
        assert_eq!(missing.severity().exit_code(), 3);

        let status = EtlError::HttpStatusError {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert_eq!(status.severity(), ErrorSeverity::Medium);
        assert_eq!(status.severity().exit_code(), 2);

        let config = EtlError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.severity().exit_code(), 1);
    }

    #[test]
    fn test_retryable_statuses() {
        let retry = |status| EtlError::HttpStatusError {
            url: "u".to_string(),
            status,
        };
        assert!(retry(503).is_retryable());
        assert!(retry(429).is_retryable());
        assert!(!retry(404).is_retryable());
        assert!(!EtlError::ProcessingError {
            message: "x".to_string()
        }
        .is_retryable());
    }
}
