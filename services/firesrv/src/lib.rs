//! Fire detection monitor (firesrv)
//!
//! Polls an ambient temperature sensor and raises an alarm when the reading
//! crosses a threshold: the display blinks red/white, the buzzer sounds and
//! SMS / datastore notifications are sent. The alarm clears when the reading
//! drops back below the threshold.
//!
//! ```text
//! SensorPoller ──► ThresholdDetector ──► SignalBus ──┬──► AlarmPresenter ──► Panel
//!                                                    └──► Notifier ──► SMS / datastore
//! ```

pub mod config;
pub mod detector;
pub mod drivers;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod poller;
pub mod presenter;
pub mod signal;

pub use config::FireConfig;
pub use error::{FireSrvError, Result};
pub use monitor::{FireMonitor, Hardware, MonitorHandle};
pub use notifier::NotifierClients;
pub use signal::{AlarmSignal, SignalBus};

pub const SERVICE_NAME: &str = "firesrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
