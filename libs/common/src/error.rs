use errors::{ErrorCategory, ServiceError};
use thiserror::Error;

/// Basic library error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error result type
pub type Result<T> = std::result::Result<T, Error>;

impl ServiceError for Error {
    fn error_code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIGURATION_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Configuration,
            Error::Io(_) => ErrorCategory::Internal,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}
