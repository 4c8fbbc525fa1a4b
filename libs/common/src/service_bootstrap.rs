//! Unified service bootstrap utilities
//!
//! Startup banner and logging initialization shared by fire-monitor services.

use crate::bootstrap_args::ServiceArgs;
use crate::logging::{self, LogConfig};
use tracing::info;

/// Service metadata for startup
pub struct ServiceInfo {
    /// Service name (e.g., "firesrv")
    pub name: String,
    /// Service version from Cargo.toml
    pub version: String,
    /// Service description
    pub description: String,
}

impl ServiceInfo {
    /// Create new service info
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }
}

/// Print startup banner
pub fn print_startup_banner(service: &ServiceInfo) {
    let banner = r#"
 ███████╗██╗██████╗ ███████╗███████╗██████╗ ██╗   ██╗
 ██╔════╝██║██╔══██╗██╔════╝██╔════╝██╔══██╗██║   ██║
 █████╗  ██║██████╔╝█████╗  ███████╗██████╔╝██║   ██║
 ██╔══╝  ██║██╔══██╗██╔══╝  ╚════██║██╔══██╗╚██╗ ██╔╝
 ██║     ██║██║  ██║███████╗███████║██║  ██║ ╚████╔╝
 ╚═╝     ╚═╝╚═╝  ╚═╝╚══════╝╚══════╝╚═╝  ╚═╝  ╚═══╝
    "#;

    info!("{}", banner);
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!("");
}

/// Initialize logging for a service from its command-line arguments
///
/// Log root directory priority:
/// 1. FIRE_LOG_DIR environment variable
/// 2. `log_dir` argument
/// 3. Default "logs"
pub fn init_logging(
    service: &ServiceInfo,
    args: &ServiceArgs,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let log_config = LogConfig {
        service_name: service.name.clone(),
        log_dir: logging::resolve_log_root(log_dir).join(&service.name),
        level: args.parse_log_level(),
        enable_file: !args.no_file_log,
        ansi: !args.no_color,
    };

    logging::init_with_config(log_config).map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
