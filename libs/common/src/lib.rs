//! Fire-monitor basic library
//!
//! Provides basic functions shared by all services, including:
//! - logging functions
//! - layered configuration loading
//! - command-line arguments and startup helpers
//! - shutdown signal handling

pub mod bootstrap_args;
pub mod config_loader;
pub mod error;
pub mod logging;
pub mod serde_helpers;
pub mod service_bootstrap;
pub mod shutdown;

pub use bootstrap_args::ServiceArgs;
pub use config_loader::{config_sources, load_layered, ConfigFile};
pub use error::{Error, Result};
pub use service_bootstrap::ServiceInfo;

// Re-export common dependencies
pub use anyhow;
pub use clap;
pub use clap::Parser;
