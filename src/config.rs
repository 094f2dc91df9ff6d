//! Serializable core configuration
//!
//! Everything the wrapper would otherwise hard-wire: master tick rate,
//! divider setting, tone parameters, synthetic sync timing and key layout.
//! Stored as JSON; every field falls back to its default when absent.

use crate::divider::DutyMode;
use crate::keyboard::KeyBindings;
use crate::stimulus::VideoTiming;
use crate::{CoreError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// NTSC colour-burst multiple driving the console (2 x 3.579545 MHz)
pub const DEFAULT_TICK_RATE_HZ: u32 = 7_159_090;

/// Divider setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerConfig {
    /// Period is `divisor + 1` master ticks
    pub divisor: u16,
    /// Derived tick shape
    pub duty: DutyMode,
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self {
            divisor: 1,
            duty: DutyMode::Short,
        }
    }
}

/// Tone and PCM output setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Phase increment per master tick
    pub freq: u16,
    /// Left volume (4.12 fixed point)
    pub vol_left: i16,
    /// Right volume (4.12 fixed point)
    pub vol_right: i16,
    /// Output sample rate for rendered audio
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            freq: 2_000,
            vol_left: 0x0800,
            vol_right: 0x0800,
            sample_rate: 44_100,
        }
    }
}

/// Complete core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Master tick rate
    pub tick_rate_hz: u32,
    /// Divider setting
    pub divider: DividerConfig,
    /// Tone setting
    pub audio: AudioConfig,
    /// Synthetic sync timing
    pub video: VideoTiming,
    /// Key layout
    pub keys: KeyBindings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            divider: DividerConfig::default(),
            audio: AudioConfig::default(),
            video: VideoTiming::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl CoreConfig {
    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)
            .map_err(|e| CoreError::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Write as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        debug!("saved config to {}", path.display());
        Ok(())
    }

    /// Check value ranges and key bindings
    ///
    /// Sync timing that never reaches the blanking thresholds is allowed
    /// (it reproduces a stuck detector) but logged as a warning.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(CoreError::ConfigError("tick_rate_hz must be non-zero".into()));
        }
        if self.divider.divisor == 0 {
            return Err(CoreError::ConfigError("divisor must be at least 1".into()));
        }
        if self.audio.sample_rate == 0 || self.audio.sample_rate > self.tick_rate_hz {
            return Err(CoreError::ConfigError(format!(
                "sample_rate {} must be in 1..={}",
                self.audio.sample_rate, self.tick_rate_hz
            )));
        }
        self.video.validate()?;
        self.keys.validate()?;
        if !self.video.reaches_thresholds() {
            warn!(
                "sync timing {}x{} never reaches the blanking thresholds; blanking will stay latched",
                self.video.h_period, self.video.lines
            );
        }
        Ok(())
    }

    /// Set the divider
    pub fn with_divider(mut self, divisor: u16, duty: DutyMode) -> Self {
        self.divider = DividerConfig { divisor, duty };
        self
    }

    /// Set the tone frequency input
    pub fn with_freq(mut self, freq: u16) -> Self {
        self.audio.freq = freq;
        self
    }

    /// Set both channel volumes
    pub fn with_volume(mut self, vol_left: i16, vol_right: i16) -> Self {
        self.audio.vol_left = vol_left;
        self.audio.vol_right = vol_right;
        self
    }

    /// Set the rendered sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.audio.sample_rate = sample_rate;
        self
    }

    /// Master ticks per second of derived ticks
    pub fn derived_tick_rate_hz(&self) -> f64 {
        f64::from(self.tick_rate_hz) / (f64::from(self.divider.divisor) + 1.0)
    }

    /// Approximate output tone for the configured `freq`
    pub fn tone_hz(&self) -> f64 {
        crate::audio::tone_frequency_hz(f64::from(self.tick_rate_hz), self.audio.freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_validate() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_rate_hz, 7_159_090);
        assert_eq!(config.divider.divisor, 1);
        assert_eq!(config.divider.duty, DutyMode::Short);
        assert_eq!(config.audio.sample_rate, 44_100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            CoreConfig::from_json_str(r#"{"divider": {"divisor": 8}, "audio": {"freq": 500}}"#)
                .unwrap();
        assert_eq!(config.divider.divisor, 8);
        assert_eq!(config.divider.duty, DutyMode::Short);
        assert_eq!(config.audio.freq, 500);
        assert_eq!(config.audio.vol_left, 0x0800);
        assert_eq!(config.keys, KeyBindings::default());
    }

    #[test]
    fn test_duty_is_lowercase() {
        let config = CoreConfig::from_json_str(r#"{"divider": {"duty": "half"}}"#).unwrap();
        assert_eq!(config.divider.duty, DutyMode::Half);
        assert!(CoreConfig::from_json_str(r#"{"divider": {"duty": "Half"}}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = CoreConfig::default()
            .with_divider(24, DutyMode::Half)
            .with_freq(1234)
            .with_volume(0x1000, -0x1000);
        let json = config.to_json_string().unwrap();
        assert_eq!(CoreConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects() {
        let zero_div = CoreConfig::default().with_divider(0, DutyMode::Short);
        assert!(matches!(zero_div.validate(), Err(CoreError::ConfigError(_))));

        let fast = CoreConfig::default().with_sample_rate(DEFAULT_TICK_RATE_HZ + 1);
        assert!(fast.validate().is_err());

        let mut dup = CoreConfig::default();
        dup.keys.deselect = dup.keys.serve;
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_short_lines_are_allowed() {
        let mut config = CoreConfig::default();
        config.video.h_period = 50;
        config.video.h_sync_width = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.json");
        let config = CoreConfig::default().with_freq(777);
        config.save(&path).unwrap();
        assert_eq!(CoreConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = CoreConfig::load("/nonexistent/ay38500.json").unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn test_derived_rates() {
        let config = CoreConfig::default();
        assert_relative_eq!(config.derived_tick_rate_hz(), 3_579_545.0);
        assert!(config.tone_hz() > 0.0);
    }
}
