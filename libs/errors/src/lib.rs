//! Unified error classification for fire-monitor services
//!
//! Each service keeps its own domain error enum and implements
//! [`ServiceError`] to expose a common code, category and log level.

use std::fmt;

/// Error category enum - used for classification and log routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Network,
    Timeout,

    // Hardware layer
    Hardware,

    // External services (SMS gateway, datastore)
    ExternalService,

    // System level
    Internal,

    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Hardware => "hardware",
            Self::ExternalService => "external_service",
            Self::Internal => "internal",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Common capability trait for service error types
///
/// Services keep their domain-specific variants and gain a shared
/// outward-facing interface by implementing this trait.
pub trait ServiceError: std::error::Error + Send + Sync + 'static {
    /// Stable error code (for logs and monitoring)
    fn error_code(&self) -> &'static str;

    /// Error category
    fn category(&self) -> ErrorCategory;

    /// Log level appropriate for this error
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Configuration => Level::ERROR,
            ErrorCategory::Hardware
            | ErrorCategory::Network
            | ErrorCategory::Timeout
            | ErrorCategory::ExternalService => Level::WARN,
            ErrorCategory::Unknown => Level::WARN,
        }
    }
}

/// Log an error at the level implied by its category
///
/// Recoverable failures (a skipped sensor tick, a dropped notification)
/// go through here so that they are recorded but never propagated.
pub fn log_service_error<E: ServiceError + ?Sized>(context: &str, err: &E) {
    let code = err.error_code();
    match err.log_level() {
        tracing::Level::ERROR => tracing::error!(code = code, "{}: {}", context, err),
        tracing::Level::WARN => tracing::warn!(code = code, "{}: {}", context, err),
        tracing::Level::INFO => tracing::info!(code = code, "{}: {}", context, err),
        _ => tracing::debug!(code = code, "{}: {}", context, err),
    }
}
