//! Two-stage volume multiply pipeline
//!
//! Delays `(x, vol_left, vol_right)` by two ticks before the fixed-point
//! multiply so the audio output lines up with the other registered outputs
//! of the core.

use crate::bits::product_bits_27_12;

/// One pipeline stage: an oscillator sample and the two channel volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStage {
    /// Oscillator x sampled on entry
    pub x: i16,
    /// Left volume sampled on entry
    pub vol_left: i16,
    /// Right volume sampled on entry
    pub vol_right: i16,
}

/// Stereo PCM sample pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StereoSample {
    /// Left channel
    pub left: i16,
    /// Right channel
    pub right: i16,
}

/// Fixed-point product as the hardware multiplier slices it
///
/// Takes bits 27..12 of the full 32-bit signed product.
#[inline]
pub fn scale(x: i16, volume: i16) -> i16 {
    product_bits_27_12(i32::from(x) * i32::from(volume))
}

/// Shift register feeding the volume multipliers
#[derive(Debug, Clone, Default)]
pub struct VolumePipeline {
    stages: [PipelineStage; 2],
    output: StereoSample,
}

impl VolumePipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock a new stage in and return the registered output
    ///
    /// The returned sample is the product of the stage that entered two
    /// ticks ago.
    #[inline]
    pub fn tick(&mut self, input: PipelineStage) -> StereoSample {
        let [first, second] = self.stages;
        self.output = StereoSample {
            left: scale(second.x, second.vol_left),
            right: scale(second.x, second.vol_right),
        };
        self.stages = [input, first];
        self.output
    }

    /// Last registered output
    #[inline]
    pub fn output(&self) -> StereoSample {
        self.output
    }

    /// Current stage contents, newest first
    #[inline]
    pub fn stages(&self) -> [PipelineStage; 2] {
        self.stages
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
