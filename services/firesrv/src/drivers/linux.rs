//! Linux hardware drivers
//!
//! - Grove analog temperature sensor read through the IIO sysfs ADC
//! - JHD1313M1 16x2 RGB LCD over I2C (LCD controller 0x3E, backlight 0x62)
//! - Piezo buzzer driven by a sysfs PWM channel

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use tracing::{debug, info};

use super::{Buzzer, Display, DriverError, DriverResult, Rgb, TemperatureSensor};
use crate::config::HardwareConfig;

/// Thermistor B constant of the Grove temperature sensor
const THERMISTOR_B: f64 = 3975.0;
/// Thermistor resistance at 25 °C, also the divider resistor
const THERMISTOR_R0: f64 = 10_000.0;
const KELVIN_25C: f64 = 298.15;
const KELVIN_0C: f64 = 273.15;

/// Celsius temperature for a raw ADC sample, rounded to whole degrees
pub fn grove_celsius(raw: u32, adc_max: u32) -> DriverResult<f64> {
    if raw == 0 || raw >= adc_max {
        return Err(DriverError::InvalidReading(format!(
            "ADC sample {} outside thermistor range",
            raw
        )));
    }
    let raw = f64::from(raw);
    let resistance = (f64::from(adc_max) - raw) * THERMISTOR_R0 / raw;
    let kelvin = 1.0 / ((resistance / THERMISTOR_R0).ln() / THERMISTOR_B + 1.0 / KELVIN_25C);
    Ok((kelvin - KELVIN_0C).round())
}

/// Grove temperature sensor on an IIO ADC channel
pub struct GroveTemperature {
    raw_path: PathBuf,
    adc_max: u32,
}

impl GroveTemperature {
    pub fn open(raw_path: impl Into<PathBuf>, adc_max: u32) -> DriverResult<Self> {
        let raw_path = raw_path.into();
        if !raw_path.exists() {
            return Err(DriverError::Unavailable(format!(
                "ADC channel {} not found",
                raw_path.display()
            )));
        }
        info!("Temperature sensor on {}", raw_path.display());
        Ok(Self { raw_path, adc_max })
    }
}

impl TemperatureSensor for GroveTemperature {
    fn read(&mut self) -> DriverResult<f64> {
        let text = fs::read_to_string(&self.raw_path)?;
        let raw = text
            .trim()
            .parse::<u32>()
            .map_err(|e| DriverError::InvalidReading(format!("'{}': {}", text.trim(), e)))?;
        grove_celsius(raw, self.adc_max)
    }
}

const LCD_ADDRESS: u16 = 0x3E;
const RGB_ADDRESS: u16 = 0x62;

const LCD_COMMAND: u8 = 0x80;
const LCD_DATA: u8 = 0x40;

const LCD_FUNCTION_2LINE: u8 = 0x28;
const LCD_DISPLAY_ON: u8 = 0x0C;
const LCD_CLEAR: u8 = 0x01;
const LCD_ENTRY_LEFT: u8 = 0x06;
const LCD_LINE0: u8 = 0x80;
const LCD_LINE1: u8 = 0xC0;

const RGB_MODE1: u8 = 0x00;
const RGB_MODE2: u8 = 0x01;
const RGB_OUTPUT: u8 = 0x08;
const RGB_BLUE: u8 = 0x02;
const RGB_GREEN: u8 = 0x03;
const RGB_RED: u8 = 0x04;

fn bus_error(e: impl std::fmt::Display) -> DriverError {
    DriverError::Bus(e.to_string())
}

/// JHD1313M1 RGB backlit LCD
pub struct Jhd1313m1 {
    lcd: LinuxI2CDevice,
    rgb: LinuxI2CDevice,
}

impl Jhd1313m1 {
    pub fn open(bus: impl AsRef<Path>) -> DriverResult<Self> {
        let bus = bus.as_ref();
        let lcd = LinuxI2CDevice::new(bus, LCD_ADDRESS).map_err(bus_error)?;
        let rgb = LinuxI2CDevice::new(bus, RGB_ADDRESS).map_err(bus_error)?;
        let mut display = Self { lcd, rgb };

        thread::sleep(Duration::from_millis(50));
        for cmd in [LCD_FUNCTION_2LINE, LCD_DISPLAY_ON, LCD_CLEAR, LCD_ENTRY_LEFT] {
            display.command(cmd)?;
            thread::sleep(Duration::from_millis(2));
        }

        display.register(RGB_MODE1, 0)?;
        display.register(RGB_MODE2, 0)?;
        display.register(RGB_OUTPUT, 0xAA)?;

        info!("LCD on {}", bus.display());
        Ok(display)
    }

    fn command(&mut self, cmd: u8) -> DriverResult<()> {
        self.lcd.write(&[LCD_COMMAND, cmd]).map_err(bus_error)
    }

    fn register(&mut self, register: u8, value: u8) -> DriverResult<()> {
        self.rgb.write(&[register, value]).map_err(bus_error)
    }
}

impl Display for Jhd1313m1 {
    fn set_color(&mut self, color: Rgb) -> DriverResult<()> {
        self.register(RGB_RED, color.r)?;
        self.register(RGB_GREEN, color.g)?;
        self.register(RGB_BLUE, color.b)
    }

    fn write_line(&mut self, line: u8, text: &str) -> DriverResult<()> {
        let cursor = if line == 0 { LCD_LINE0 } else { LCD_LINE1 };
        self.command(cursor)?;
        for ch in text.chars() {
            // The controller ROM only maps ASCII reliably
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.lcd.write(&[LCD_DATA, byte]).map_err(bus_error)?;
        }
        Ok(())
    }
}

/// Piezo buzzer on a sysfs PWM channel
pub struct PwmBuzzer {
    channel: PathBuf,
    volume: f32,
}

impl PwmBuzzer {
    pub fn open(chip: impl AsRef<Path>, channel: u32) -> DriverResult<Self> {
        let chip = chip.as_ref();
        let path = chip.join(format!("pwm{}", channel));
        if !path.exists() {
            fs::write(chip.join("export"), channel.to_string())?;
        }
        info!("Buzzer on {}", path.display());
        Ok(Self {
            channel: path,
            volume: 1.0,
        })
    }

    fn attr(&self, name: &str, value: u64) -> DriverResult<()> {
        fs::write(self.channel.join(name), value.to_string())?;
        Ok(())
    }
}

impl Buzzer for PwmBuzzer {
    fn set_volume(&mut self, level: f32) -> DriverResult<()> {
        self.volume = level.clamp(0.0, 1.0);
        Ok(())
    }

    fn play(&mut self, frequency_hz: u32) -> DriverResult<()> {
        if frequency_hz == 0 {
            return self.stop();
        }
        let period_ns = 1_000_000_000 / u64::from(frequency_hz);
        // Half duty cycle is the loudest square wave
        let duty_ns = (period_ns as f64 * f64::from(self.volume) * 0.5) as u64;

        // Duty must never exceed the period, also while changing the period
        self.attr("duty_cycle", 0)?;
        self.attr("period", period_ns)?;
        self.attr("duty_cycle", duty_ns)?;
        self.attr("enable", 1)?;
        debug!("PWM period {} ns, duty {} ns", period_ns, duty_ns);
        Ok(())
    }

    fn stop(&mut self) -> DriverResult<()> {
        self.attr("duty_cycle", 0)?;
        self.attr("enable", 0)
    }
}

/// Open the sensor, display and buzzer described by `config`
pub fn open(
    config: &HardwareConfig,
) -> DriverResult<(GroveTemperature, Jhd1313m1, PwmBuzzer)> {
    Ok((
        GroveTemperature::open(&config.sensor_path, config.adc_max)?,
        Jhd1313m1::open(&config.i2c_bus)?,
        PwmBuzzer::open(&config.pwm_chip, config.pwm_channel)?,
    ))
}
