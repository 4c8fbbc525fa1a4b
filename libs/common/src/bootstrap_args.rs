//! Common command-line arguments for fire-monitor services

use clap::Parser;
use std::path::PathBuf;

/// Common service startup arguments
#[derive(Debug, Clone, Parser)]
#[clap(author, version, about)]
pub struct ServiceArgs {
    /// Configuration file (YAML or JSON). Defaults to config/<service>.yaml
    #[clap(short = 'c', long, env = "FIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[clap(short = 'l', long, default_value = "info")]
    pub log_level: String,

    /// Disable colored output (useful for log files)
    #[clap(long)]
    pub no_color: bool,

    /// Log to the console only
    #[clap(long)]
    pub no_file_log: bool,

    /// Only validate configuration without starting service
    #[clap(long)]
    pub validate: bool,

    /// Use simulated sensor, display and buzzer drivers
    #[clap(long)]
    pub simulate: bool,
}

impl Default for ServiceArgs {
    fn default() -> Self {
        Self {
            config: None,
            log_level: "info".to_string(),
            no_color: false,
            no_file_log: false,
            validate: false,
            simulate: false,
        }
    }
}

impl ServiceArgs {
    /// Parse log level string to tracing::Level
    pub fn parse_log_level(&self) -> tracing::Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" | "warning" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }

    /// Config file to load: the explicit one is required, the default is not
    pub fn config_file(&self, service_name: &str) -> crate::config_loader::ConfigFile {
        use crate::config_loader::ConfigFile;

        match &self.config {
            Some(path) => ConfigFile::required(path.clone()),
            None => ConfigFile::optional(format!("config/{}.yaml", service_name)),
        }
    }
}
