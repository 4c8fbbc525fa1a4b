//! Simulated drivers
//!
//! Used with `--simulate` or when built without the `hardware` feature.
//! The display and buzzer only log what real hardware would do.

use tracing::{debug, info};

use super::{Buzzer, Display, DriverError, DriverResult, Rgb, TemperatureSensor};

/// Readings for one simulated heat cycle: 20 up to 70 and back, step 5
pub fn default_ramp() -> Vec<f64> {
    let up = (4..=14).map(|i| f64::from(i) * 5.0);
    let down = (5..14).rev().map(|i| f64::from(i) * 5.0);
    up.chain(down).collect()
}

/// Cycles through a fixed list of readings
pub struct ScriptedSensor {
    readings: Vec<f64>,
    position: usize,
}

impl ScriptedSensor {
    pub fn new(readings: Vec<f64>) -> Self {
        let readings = if readings.is_empty() {
            default_ramp()
        } else {
            readings
        };
        Self {
            readings,
            position: 0,
        }
    }
}

impl TemperatureSensor for ScriptedSensor {
    fn read(&mut self) -> DriverResult<f64> {
        let value = *self
            .readings
            .get(self.position)
            .ok_or_else(|| DriverError::InvalidReading("empty script".to_string()))?;
        self.position = (self.position + 1) % self.readings.len();
        Ok(value)
    }
}

#[derive(Default)]
pub struct LogDisplay {
    color: Option<Rgb>,
}

impl Display for LogDisplay {
    fn set_color(&mut self, color: Rgb) -> DriverResult<()> {
        if self.color != Some(color) {
            debug!("[display] color ({}, {}, {})", color.r, color.g, color.b);
            self.color = Some(color);
        }
        Ok(())
    }

    fn write_line(&mut self, line: u8, text: &str) -> DriverResult<()> {
        debug!("[display] line {}: '{}'", line, text);
        Ok(())
    }
}

#[derive(Default)]
pub struct LogBuzzer {
    volume: f32,
    playing: bool,
}

impl Buzzer for LogBuzzer {
    fn set_volume(&mut self, level: f32) -> DriverResult<()> {
        self.volume = level.clamp(0.0, 1.0);
        Ok(())
    }

    fn play(&mut self, frequency_hz: u32) -> DriverResult<()> {
        if !self.playing {
            info!("[buzzer] {} Hz at volume {:.1}", frequency_hz, self.volume);
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> DriverResult<()> {
        if self.playing {
            info!("[buzzer] silent");
        }
        self.playing = false;
        Ok(())
    }
}
