//! Tone synthesis
//!
//! Direct digital synthesis of a sine-like tone with per-channel volume:
//! - [`PhaseAccumulator`] turns `freq` into a step pulse train
//! - [`QuadratureOscillator`] advances once per step pulse
//! - [`VolumePipeline`] delays and scales the oscillator into stereo PCM
//!
//! All three are registered: each tick reads the state latched by the
//! previous tick, so a carry out of the accumulator moves the oscillator on
//! the following tick, and a volume change reaches the output two ticks later.

pub mod oscillator;
pub mod pipeline;

pub use oscillator::{tone_frequency_hz, PhaseAccumulator, QuadratureOscillator};
pub use pipeline::{PipelineStage, StereoSample, VolumePipeline};

/// Stereo tone generator driven by the master tick
#[derive(Debug, Clone, Default)]
pub struct AudioSynthesizer {
    phase: PhaseAccumulator,
    oscillator: QuadratureOscillator,
    pipeline: VolumePipeline,
}

impl AudioSynthesizer {
    /// Create a synthesizer in its reset state
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.phase.reset();
        self.oscillator.reset();
        self.pipeline.reset();
    }

    /// Advance one master tick and return the registered stereo sample
    pub fn tick(&mut self, freq: u16, vol_left: i16, vol_right: i16) -> StereoSample {
        let sample = self.pipeline.tick(PipelineStage {
            x: self.oscillator.x(),
            vol_left,
            vol_right,
        });

        if self.phase.step_pulse() {
            self.oscillator.step();
        }
        self.phase.tick(freq);

        sample
    }

    /// Last registered stereo sample
    #[inline]
    pub fn output(&self) -> StereoSample {
        self.pipeline.output()
    }

    /// Oscillator state
    #[inline]
    pub fn oscillator(&self) -> &QuadratureOscillator {
        &self.oscillator
    }

    /// Step generator state
    #[inline]
    pub fn phase(&self) -> &PhaseAccumulator {
        &self.phase
    }

    /// Render `count` ticks with constant inputs into interleaved L/R samples
    pub fn render(&mut self, freq: u16, vol_left: i16, vol_right: i16, count: usize) -> Vec<i16> {
        let mut out = Vec::with_capacity(count * 2);
        for _ in 0..count {
            let s = self.tick(freq, vol_left, vol_right);
            out.push(s.left);
            out.push(s.right);
        }
        out
    }
}
