//! Audio export
//!
//! The core produces one stereo sample per master tick, far above any audio
//! rate. Export decimates that stream to the configured sample rate and
//! writes 16-bit PCM.
//!
//! # Examples
//!
//! ```no_run
//! use ay38500::config::CoreConfig;
//! use ay38500::export::{export_session_to_wav, ExportConfig};
//! use ay38500::session::Session;
//! use ay38500::stimulus::PressSchedule;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig::default();
//! let mut session = Session::new(&config, PressSchedule::default())?;
//! let export = ExportConfig::with_sample_rate(config.audio.sample_rate).fade_out(0.1);
//! export_session_to_wav(&mut session, config.tick_rate_hz, 7_159_090, "tone.wav", &export)?;
//! # Ok(())
//! # }
//! ```

mod wav;
pub use wav::*;

use crate::audio::StereoSample;

/// Export configuration options
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Sample rate for export (default: 44100 Hz)
    pub sample_rate: u32,
    /// Fade out duration in seconds (0 = no fade)
    pub fade_out_duration: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            fade_out_duration: 0.0,
        }
    }
}

impl ExportConfig {
    /// Create config with custom sample rate
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Add fade out at the end
    pub fn fade_out(mut self, duration_seconds: f32) -> Self {
        self.fade_out_duration = duration_seconds;
        self
    }
}

/// Box-filter decimator from the master tick rate to an audio rate
///
/// Averages every tick sample falling into one output period, so the
/// fractional tick/sample ratio is tracked exactly with an integer
/// accumulator.
#[derive(Debug, Clone)]
pub struct Decimator {
    tick_rate_hz: u64,
    sample_rate: u64,
    phase: u64,
    sum_left: i64,
    sum_right: i64,
    count: i64,
}

impl Decimator {
    /// Create a decimator; `sample_rate` must not exceed `tick_rate_hz`
    pub fn new(tick_rate_hz: u32, sample_rate: u32) -> Self {
        Self {
            tick_rate_hz: u64::from(tick_rate_hz.max(1)),
            sample_rate: u64::from(sample_rate.clamp(1, tick_rate_hz.max(1))),
            phase: 0,
            sum_left: 0,
            sum_right: 0,
            count: 0,
        }
    }

    /// Feed one tick sample; returns an output sample when a period closes
    #[inline]
    pub fn push(&mut self, sample: StereoSample) -> Option<StereoSample> {
        self.sum_left += i64::from(sample.left);
        self.sum_right += i64::from(sample.right);
        self.count += 1;
        self.phase += self.sample_rate;
        if self.phase < self.tick_rate_hz {
            return None;
        }
        self.phase -= self.tick_rate_hz;
        let out = StereoSample {
            left: (self.sum_left / self.count) as i16,
            right: (self.sum_right / self.count) as i16,
        };
        self.sum_left = 0;
        self.sum_right = 0;
        self.count = 0;
        Some(out)
    }
}

/// Apply a linear fade to the last `fade_duration` seconds
fn apply_fade_out(samples: &mut [StereoSample], fade_duration: f32, sample_rate: u32) {
    if fade_duration <= 0.0 || samples.is_empty() {
        return;
    }

    let fade_samples = ((fade_duration * sample_rate as f32) as usize).max(1);
    let start_fade = samples.len().saturating_sub(fade_samples);

    for (i, sample) in samples.iter_mut().enumerate().skip(start_fade) {
        let progress = (i - start_fade) as f32 / fade_samples as f32;
        let fade_factor = 1.0 - progress;
        sample.left = (f32::from(sample.left) * fade_factor) as i16;
        sample.right = (f32::from(sample.right) * fade_factor) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: i16) -> StereoSample {
        StereoSample { left: v, right: -v }
    }

    #[test]
    fn test_decimator_ratio() {
        let mut dec = Decimator::new(7_159_090, 44_100);
        let produced = (0..7_159_090).filter_map(|_| dec.push(s(100))).count();
        assert_eq!(produced, 44_100);
    }

    #[test]
    fn test_decimator_averages() {
        let mut dec = Decimator::new(4, 1);
        assert_eq!(dec.push(s(0)), None);
        assert_eq!(dec.push(s(100)), None);
        assert_eq!(dec.push(s(200)), None);
        assert_eq!(dec.push(s(300)), Some(s(150)));
    }

    #[test]
    fn test_decimator_passthrough_at_tick_rate() {
        let mut dec = Decimator::new(1_000, 1_000);
        assert_eq!(dec.push(s(7)), Some(s(7)));
        assert_eq!(dec.push(s(-9)), Some(s(-9)));
    }

    #[test]
    fn test_fade_out() {
        let mut samples = vec![s(1000); 10];
        apply_fade_out(&mut samples, 0.5, 10);
        assert_eq!(samples[4], s(1000));
        assert_eq!(samples[5], s(1000));
        // 1000 * 0.2, truncated
        assert!((199..=200).contains(&samples[9].left));
    }

    #[test]
    fn test_export_config_builder() {
        let config = ExportConfig::with_sample_rate(22_050).fade_out(1.5);
        assert_eq!(config.sample_rate, 22_050);
        assert_eq!(config.fade_out_duration, 1.5);
    }
}
