//! Display + buzzer output panel
//!
//! Single owner of the output hardware. Every display and buzzer call in the
//! service goes through a [`SharedPanel`], so driver calls are serialized
//! behind one mutex. Driver failures are logged and swallowed: a broken
//! backlight must not stop the buzzer, and neither may stop detection.

use std::sync::Arc;

use errors::{log_service_error, ErrorCategory, ServiceError};
use parking_lot::Mutex;

use super::{fit_line, Buzzer, Display, DriverError, DriverResult, Rgb};

/// Buzzer volume while alarming
pub const ALARM_VOLUME: f32 = 0.5;
/// Buzzer tone while alarming
pub const ALARM_TONE_HZ: u32 = 2600;

/// Display line for the live temperature
pub const STATUS_LINE: u8 = 0;
/// Display line for the alarm message
pub const ALERT_LINE: u8 = 1;

pub type SharedPanel = Arc<Mutex<Panel>>;

impl ServiceError for DriverError {
    fn error_code(&self) -> &'static str {
        match self {
            DriverError::Io(_) => "DRIVER_IO",
            DriverError::Unavailable(_) => "DEVICE_UNAVAILABLE",
            DriverError::InvalidReading(_) => "INVALID_READING",
            DriverError::Bus(_) => "BUS_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Hardware
    }
}

pub struct Panel {
    display: Box<dyn Display>,
    buzzer: Box<dyn Buzzer>,
}

impl Panel {
    pub fn new(display: Box<dyn Display>, buzzer: Box<dyn Buzzer>) -> Self {
        Self { display, buzzer }
    }

    pub fn shared(self) -> SharedPanel {
        Arc::new(Mutex::new(self))
    }

    /// Red backlight
    pub fn alert(&mut self) {
        self.color(Rgb::RED);
    }

    /// White backlight
    pub fn idle(&mut self) {
        self.color(Rgb::WHITE);
    }

    fn color(&mut self, color: Rgb) {
        check("display color", self.display.set_color(color));
    }

    /// Write `text` on `line`, padded/truncated to the display width
    pub fn message(&mut self, line: u8, text: &str) {
        check("display write", self.display.write_line(line, &fit_line(text)));
    }

    /// Sound the alarm tone at alarm volume
    pub fn buzz(&mut self) {
        check("buzzer volume", self.buzzer.set_volume(ALARM_VOLUME));
        check("buzzer play", self.buzzer.play(ALARM_TONE_HZ));
    }

    /// Silence the buzzer
    ///
    /// Stop is issued twice: a single stop leaves some buzzers emitting a
    /// residual tone.
    pub fn silence(&mut self) {
        check("buzzer stop", self.buzzer.stop());
        check("buzzer stop", self.buzzer.stop());
    }

    /// Idle backlight, empty alert line, silent buzzer
    pub fn reset(&mut self) {
        self.idle();
        self.message(ALERT_LINE, "");
        self.silence();
    }
}

fn check(context: &str, result: DriverResult<()>) {
    if let Err(e) = result {
        log_service_error(context, &e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::{recording_panel, PanelCall};

    #[test]
    fn test_reset_sequence() {
        let (panel, calls) = recording_panel();
        panel.lock().reset();

        assert_eq!(
            calls.take(),
            vec![
                PanelCall::Color(Rgb::WHITE),
                PanelCall::Write(ALERT_LINE, " ".repeat(16)),
                PanelCall::Stop,
                PanelCall::Stop,
            ]
        );
    }

    #[test]
    fn test_buzz_sets_volume_then_tone() {
        let (panel, calls) = recording_panel();
        panel.lock().buzz();

        assert_eq!(
            calls.take(),
            vec![PanelCall::Volume(ALARM_VOLUME), PanelCall::Play(ALARM_TONE_HZ)]
        );
    }

    #[test]
    fn test_silence_twice_stays_silent() {
        let (panel, calls) = recording_panel();
        {
            let mut panel = panel.lock();
            panel.buzz();
            panel.silence();
            panel.silence();
        }

        assert!(!calls.is_sounding());
        assert_eq!(calls.count(|c| matches!(c, PanelCall::Stop)), 4);
    }

    #[test]
    fn test_driver_failure_does_not_stop_other_calls() {
        let (panel, calls) = recording_panel();
        calls.fail_display(true);
        {
            let mut panel = panel.lock();
            panel.alert();
            panel.buzz();
        }

        // Display calls failed and were not recorded, buzzer still sounded
        assert!(calls.is_sounding());
        assert_eq!(calls.count(|c| matches!(c, PanelCall::Color(_))), 0);
    }
}
