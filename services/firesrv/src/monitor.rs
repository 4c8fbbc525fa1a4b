//! Fire monitor orchestration
//!
//! Owns the hardware and wires poller -> signal bus -> {presenter, notifier}.
//! Subscriptions are taken before the poller starts, so no signal can be
//! published before both listeners are attached.

use tokio::task::JoinHandle;
use tracing::info;

use crate::config::FireConfig;
use crate::detector::ThresholdDetector;
use crate::drivers::sim::{LogBuzzer, LogDisplay, ScriptedSensor};
use crate::drivers::{Panel, SharedPanel, TemperatureSensor};
use crate::error::{FireSrvError, Result};
use crate::notifier::{Notifier, NotifierClients};
use crate::poller::SensorPoller;
use crate::presenter::AlarmPresenter;
use crate::signal::SignalBus;

/// Sensor plus the output panel
pub struct Hardware {
    pub sensor: Box<dyn TemperatureSensor>,
    pub panel: SharedPanel,
}

impl Hardware {
    pub fn new(sensor: Box<dyn TemperatureSensor>, panel: SharedPanel) -> Self {
        Self { sensor, panel }
    }

    /// Scripted sensor with log-only display and buzzer
    pub fn simulated(config: &FireConfig) -> Self {
        info!("Using simulated drivers");
        Self::new(
            Box::new(ScriptedSensor::new(config.simulation.readings.clone())),
            Panel::new(Box::new(LogDisplay::default()), Box::new(LogBuzzer::default())).shared(),
        )
    }

    /// Grove sensor, JHD1313M1 LCD and PWM buzzer
    #[cfg(feature = "hardware")]
    pub fn linux(config: &FireConfig) -> Result<Self> {
        let (sensor, display, buzzer) = crate::drivers::linux::open(&config.hardware)?;
        Ok(Self::new(
            Box::new(sensor),
            Panel::new(Box::new(display), Box::new(buzzer)).shared(),
        ))
    }
}

pub struct FireMonitor {
    config: FireConfig,
    hardware: Hardware,
    clients: NotifierClients,
    bus: SignalBus,
}

impl FireMonitor {
    pub fn new(config: FireConfig, hardware: Hardware, clients: NotifierClients) -> Self {
        Self {
            config,
            hardware,
            clients,
            bus: SignalBus::new(),
        }
    }

    /// Bus the detector publishes on
    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Reset the panel, attach presenter and notifier, start polling
    pub fn start(self) -> MonitorHandle {
        let Self {
            config,
            hardware,
            clients,
            bus,
        } = self;
        let Hardware { sensor, panel } = hardware;

        panel.lock().reset();

        let presenter = AlarmPresenter::new(panel.clone(), config.blink_interval());
        let presenter = tokio::spawn(presenter.run(bus.subscribe()));

        let notifier = Notifier::new(clients);
        let notifier = tokio::spawn(notifier.run(bus.subscribe()));

        let poller = SensorPoller::new(
            sensor,
            ThresholdDetector::new(config.alarm_threshold),
            panel.clone(),
            bus,
            config.poll_interval(),
        );
        let poller = tokio::spawn(poller.run());

        info!(
            "Fire monitor started: threshold {}, polling every {} ms",
            config.alarm_threshold, config.poll_interval_ms
        );

        MonitorHandle {
            poller,
            presenter,
            notifier,
            panel,
        }
    }
}

pub struct MonitorHandle {
    poller: JoinHandle<()>,
    presenter: JoinHandle<()>,
    notifier: JoinHandle<()>,
    panel: SharedPanel,
}

impl MonitorHandle {
    /// Wait until a task ends; they only end on panic or abort
    pub async fn join(&mut self) -> Result<()> {
        let (name, result) = tokio::select! {
            r = &mut self.poller => ("poller", r),
            r = &mut self.presenter => ("presenter", r),
            r = &mut self.notifier => ("notifier", r),
        };
        match result {
            Ok(()) => Err(FireSrvError::InternalError(format!("{} task exited", name))),
            Err(e) => Err(FireSrvError::InternalError(format!("{} task failed: {}", name, e))),
        }
    }

    /// Stop all tasks and return the panel to its idle state
    pub async fn shutdown(self) {
        self.poller.abort();
        self.presenter.abort();
        self.notifier.abort();
        for task in [self.poller, self.presenter, self.notifier] {
            let _ = task.await;
        }
        self.panel.lock().reset();
        info!("Fire monitor stopped");
    }
}
