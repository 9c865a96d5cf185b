use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::pixel_format::{PixelFormat, Rgb};
use crate::protocol::{HeaderMode, MAX_COUNTED_LEDS};

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_LED_COUNT: usize = 54;
pub const DEFAULT_BAUD_RATE: u32 = 115200;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_FRAME_DELAY_MS: u64 = 100;

/// Longest strip accepted, whatever the header mode
pub const MAX_LED_COUNT: usize = MAX_COUNTED_LEDS;

/// Strip and animation settings. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: String,
    pub led_count: usize,
    pub baud_rate: u32,
    pub timeout_ms: u64,
    pub frame_delay_ms: u64,
    pub pixel_format: String,
    pub highlight: Rgb,
    /// Color of every pixel except the highlighted one
    pub background: Rgb,
    pub header: HeaderMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT.to_string(),
            led_count: DEFAULT_LED_COUNT,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            pixel_format: "GRB".to_string(),
            highlight: Rgb::WHITE,
            background: Rgb::new(0, 200, 0),
            header: HeaderMode::Literal,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let config_data = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&config_data).context(format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Reject settings the sweep cannot run with, before anything is opened
    pub fn validate(&self) -> Result<()> {
        ensure!(self.led_count > 0, "led_count must be at least 1");
        ensure!(self.baud_rate > 0, "baud_rate must be positive");
        ensure!(!self.port.is_empty(), "port must not be empty");
        ensure!(
            self.led_count <= MAX_LED_COUNT,
            "led_count {} exceeds the maximum of {}",
            self.led_count,
            MAX_LED_COUNT
        );
        self.format()?;
        Ok(())
    }

    pub fn format(&self) -> Result<PixelFormat> {
        PixelFormat::parse(&self.pixel_format)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.led_count, 54);
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.frame_delay(), Duration::from_millis(100));
        assert_eq!(config.format().unwrap(), PixelFormat::Grb);
        assert_eq!(config.header, HeaderMode::Literal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_json(
            r#"{"port": "/dev/ttyACM0", "led_count": 120, "background": [0, 0, 0], "header": "counted"}"#,
        )
        .unwrap();
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.led_count, 120);
        assert_eq!(config.background, Rgb::BLACK);
        assert_eq!(config.header, HeaderMode::Counted);
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_json(r#"{"leds": 10}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config { led_count: 0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { pixel_format: "RGBW".to_string(), ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { baud_rate: 0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config {
            led_count: MAX_LED_COUNT + 1,
            header: HeaderMode::Counted,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_led_count() {
        let config = Config { led_count: MAX_LED_COUNT, ..Config::default() };
        assert!(config.validate().is_ok());

        // The literal header ignores the count, but the strip is still capped
        let config = Config { led_count: MAX_LED_COUNT + 1, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { led_count: usize::MAX, ..Config::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/ada_sweep.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
