//! Error handling for the fire monitor service

use errors::{ErrorCategory, ServiceError};
use thiserror::Error;

use crate::drivers::DriverError;

/// Fire monitor service error type
#[derive(Error, Debug)]
pub enum FireSrvError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Sensor, display or buzzer failure
    #[error("Driver error: {0}")]
    DriverError(#[from] DriverError),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// SMS gateway rejected the message
    #[error("SMS gateway error: {0}")]
    SmsError(String),

    /// Datastore rejected the write
    #[error("Datastore error: {0}")]
    DatastoreError(String),

    /// Task or wiring failure
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the fire monitor service
pub type Result<T> = std::result::Result<T, FireSrvError>;

impl ServiceError for FireSrvError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "FIRESRV_CONFIG_ERROR",
            Self::DriverError(_) => "FIRESRV_DRIVER_ERROR",
            Self::HttpError(_) => "FIRESRV_HTTP_ERROR",
            Self::SmsError(_) => "FIRESRV_SMS_ERROR",
            Self::DatastoreError(_) => "FIRESRV_DATASTORE_ERROR",
            Self::InternalError(_) => "FIRESRV_INTERNAL_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError(_) => ErrorCategory::Configuration,
            Self::DriverError(_) => ErrorCategory::Hardware,
            Self::HttpError(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::SmsError(_) | Self::DatastoreError(_) => ErrorCategory::ExternalService,
            Self::InternalError(_) => ErrorCategory::Internal,
        }
    }
}

impl From<common::Error> for FireSrvError {
    fn from(err: common::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = FireSrvError::ConfigError("alarm_threshold missing".to_string());
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.log_level(), tracing::Level::ERROR);

        let err = FireSrvError::SmsError("401 Unauthorized".to_string());
        assert_eq!(err.error_code(), "FIRESRV_SMS_ERROR");
        assert_eq!(err.log_level(), tracing::Level::WARN);

        let err: FireSrvError = DriverError::Unavailable("lcd".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::Hardware);
    }

    #[test]
    fn test_from_common_error() {
        let err: FireSrvError = common::Error::Config("bad yaml".to_string()).into();
        assert!(matches!(err, FireSrvError::ConfigError(ref m) if m.contains("bad yaml")));
    }
}
