//! Hardware driver interfaces
//!
//! The monitor only depends on these capability traits. Concrete backends:
//! - [`sim`]: simulated sensor plus log-only display and buzzer
//! - [`mock`]: recording doubles for tests
//! - `linux` (feature `hardware`): Grove sensor, JHD1313M1 LCD, PWM buzzer
//!
//! All driver calls are blocking and must only be issued by one task at a
//! time; [`Panel`] enforces this for the display and buzzer.

pub mod mock;
pub mod panel;
pub mod sim;

#[cfg(feature = "hardware")]
pub mod linux;

pub use panel::{Panel, SharedPanel};

use thiserror::Error;

/// Width of one LCD line in characters
pub const LINE_WIDTH: usize = 16;

/// Driver error types
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device not available: {0}")]
    Unavailable(String),

    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    #[error("Bus error: {0}")]
    Bus(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// RGB backlight color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Ambient temperature source
pub trait TemperatureSensor: Send {
    /// One blocking read, in degrees Celsius
    fn read(&mut self) -> DriverResult<f64>;
}

/// Two-line character display with RGB backlight
pub trait Display: Send {
    fn set_color(&mut self, color: Rgb) -> DriverResult<()>;

    /// Write `text` at the start of `line`; callers pass text already fitted
    /// to [`LINE_WIDTH`]
    fn write_line(&mut self, line: u8, text: &str) -> DriverResult<()>;
}

/// Tone buzzer
pub trait Buzzer: Send {
    /// Volume in `0.0..=1.0`
    fn set_volume(&mut self, level: f32) -> DriverResult<()>;
    fn play(&mut self, frequency_hz: u32) -> DriverResult<()>;
    fn stop(&mut self) -> DriverResult<()>;
}

/// Pad with spaces or truncate to exactly [`LINE_WIDTH`] characters
///
/// Shorter text is padded so that leftovers of a previous, longer message
/// are overwritten.
pub fn fit_line(text: &str) -> String {
    let mut line: String = text.chars().take(LINE_WIDTH).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(LINE_WIDTH - len));
    line
}
