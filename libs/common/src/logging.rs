//! Unified logging module for fire-monitor services
//!
//! Console output plus a non-blocking daily-rolling log file, both using the
//! same bracketed level format.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Environment variable that overrides the log root directory
pub const LOG_DIR_ENV: &str = "FIRE_LOG_DIR";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] message fields`
///
/// Example output: `2025-12-02T00:50:44.809000Z [WARN] temperature read failed`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Keeps the non-blocking file writer alive for the process lifetime
static GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();

/// Resolve the log root directory
///
/// Priority: `FIRE_LOG_DIR` env > configured directory > `logs`
pub fn resolve_log_root(config_dir: Option<&str>) -> PathBuf {
    std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| config_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Name of the log file for a given day: `{YYYYMMDD}_{service}.log`
fn log_file_name(date: &str, service_name: &str) -> String {
    format!("{}_{}.log", date, service_name)
}

// Daily rolling file writer: a new file is opened when the local date changes
#[derive(Clone)]
struct DailyRollingWriter {
    service_name: String,
    log_dir: PathBuf,
    state: Arc<Mutex<(String, File)>>,
}

impl DailyRollingWriter {
    fn new(service_name: String, log_dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&log_dir)?;
        let today = chrono::Local::now().format("%Y%m%d").to_string();
        let file = Self::open(&log_dir, &today, &service_name)?;

        Ok(Self {
            service_name,
            log_dir,
            state: Arc::new(Mutex::new((today, file))),
        })
    }

    fn open(log_dir: &std::path::Path, date: &str, service_name: &str) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(log_file_name(date, service_name)))
    }
}

impl Write for DailyRollingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))?;

        let today = chrono::Local::now().format("%Y%m%d").to_string();
        if state.0 != today {
            fs::create_dir_all(&self.log_dir)?;
            let file = Self::open(&self.log_dir, &today, &self.service_name)?;
            *state = (today, file);
        }

        state.1.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))?;
        state.1.flush()
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name (e.g., "firesrv")
    pub service_name: String,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Default level when `RUST_LOG` is not set
    pub level: Level,
    /// Write a daily log file in addition to the console
    pub enable_file: bool,
    /// Colored console output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: resolve_log_root(None),
            level: Level::INFO,
            enable_file: true,
            ansi: true,
        }
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise `<level>,<service>=debug`
fn build_filter(config: &LogConfig) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(spec) if !spec.is_empty() => EnvFilter::new(spec),
        _ => {
            let level = config.level.as_str().to_lowercase();
            if config.level == Level::INFO {
                EnvFilter::new(format!("info,{}=debug", config.service_name))
            } else {
                EnvFilter::new(level)
            }
        },
    }
}

/// Initialize logging system with configuration
///
/// If the log directory cannot be created the service keeps running with
/// console output only.
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let mut file_error = None;
    let file_layer = if config.enable_file {
        match DailyRollingWriter::new(config.service_name.clone(), config.log_dir.clone()) {
            Ok(writer) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(writer);
                let slot = GUARD.get_or_init(|| Mutex::new(None));
                match slot.lock() {
                    Ok(mut slot) => *slot = Some(guard),
                    Err(poisoned) => *poisoned.into_inner() = Some(guard),
                }
                Some(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .event_format(BracketedLevelFormat)
                        .boxed(),
                )
            },
            Err(e) => {
                file_error = Some(e);
                None
            },
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(build_filter(&config))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    match file_error {
        Some(e) => tracing::warn!(
            "Log file disabled, cannot write to {:?}: {}",
            config.log_dir,
            e
        ),
        None if config.enable_file => {
            tracing::info!("Logging: {} @ {:?}", config.service_name, config.log_dir)
        },
        None => tracing::info!("Logging: {} (console only)", config.service_name),
    }

    Ok(())
}
