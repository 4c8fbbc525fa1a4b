//! Sensor poller
//!
//! Each tick reads the sensor, shows the reading on the status line and
//! feeds the detector, strictly in that order. A failed read or a non-finite
//! value skips the tick.

use std::time::Duration;

use errors::log_service_error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::detector::ThresholdDetector;
use crate::drivers::panel::STATUS_LINE;
use crate::drivers::{DriverError, SharedPanel, TemperatureSensor};
use crate::signal::{AlarmSignal, SignalBus};

pub struct SensorPoller {
    sensor: Box<dyn TemperatureSensor>,
    detector: ThresholdDetector,
    panel: SharedPanel,
    bus: SignalBus,
    interval: Duration,
}

impl SensorPoller {
    pub fn new(
        sensor: Box<dyn TemperatureSensor>,
        detector: ThresholdDetector,
        panel: SharedPanel,
        bus: SignalBus,
        interval: Duration,
    ) -> Self {
        Self {
            sensor,
            detector,
            panel,
            bus,
            interval,
        }
    }

    /// One poll cycle, returns the signal published, if any
    pub fn poll_once(&mut self) -> Option<AlarmSignal> {
        let reading = self.sensor.read().and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(DriverError::InvalidReading(format!("non-finite temperature {}", value)))
            }
        });
        let current = match reading {
            Ok(value) => value,
            Err(e) => {
                log_service_error("Temperature read failed, tick skipped", &e);
                return None;
            },
        };
        debug!("temperature {}", current);

        self.panel
            .lock()
            .message(STATUS_LINE, &format!("temperature: {}", current));

        let signal = self.detector.evaluate(current)?;
        self.bus.publish(signal);
        Some(signal)
    }

    /// Poll forever, first read one interval after start
    pub async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }
}
