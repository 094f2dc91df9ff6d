//! Component composition
//!
//! [`PongCore`] wires the four components the way the console wrapper does:
//! the divider's derived tick clocks the blanking detector, while the
//! synthesizer and the keyboard controller run on every master tick.
//!
//! All components see the same [`CoreInputs`] snapshot. The detector's clock
//! enable is the divider's period pulse registered on the previous master
//! tick, so it runs once per derived period in either duty mode and no
//! output feeds another component within the tick that produced it.

use crate::audio::{AudioSynthesizer, StereoSample};
use crate::blanking::BlankingDetector;
use crate::config::CoreConfig;
use crate::divider::{DutyMode, TickDivider};
use crate::keyboard::{ControlOutputs, KeyboardToggleController};
use crate::Result;
use log::debug;

/// Per-tick inputs from the wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreInputs {
    /// Synchronous reset, overrides everything else
    pub reset: bool,
    /// Divider divisor (at least 1)
    pub divisor: u16,
    /// Divider duty mode
    pub duty: DutyMode,
    /// Active-high horizontal sync
    pub hsync: bool,
    /// Active-high vertical sync
    pub vsync: bool,
    /// Phase increment
    pub freq: u16,
    /// Left volume
    pub vol_left: i16,
    /// Right volume
    pub vol_right: i16,
    /// Key scan position (0-79)
    pub scan_index: usize,
    /// Active-low key level at `scan_index`
    pub pressed_low: bool,
}

impl Default for CoreInputs {
    fn default() -> Self {
        Self {
            reset: false,
            divisor: 1,
            duty: DutyMode::Short,
            hsync: false,
            vsync: false,
            freq: 0,
            vol_left: 0,
            vol_right: 0,
            scan_index: 0,
            pressed_low: true,
        }
    }
}

impl CoreInputs {
    /// Inputs carrying the configured divider and tone setting
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            divisor: config.divider.divisor,
            duty: config.divider.duty,
            freq: config.audio.freq,
            vol_left: config.audio.vol_left,
            vol_right: config.audio.vol_right,
            ..Self::default()
        }
    }
}

/// Registered outputs after one master tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreOutputs {
    /// Derived tick level
    pub derived_tick: bool,
    /// Horizontal blanking
    pub h_blank: bool,
    /// Vertical blanking
    pub v_blank: bool,
    /// Stereo PCM sample
    pub sample: StereoSample,
    /// Game control lines
    pub controls: ControlOutputs,
}

/// The four core components clocked together
#[derive(Debug, Clone, Default)]
pub struct PongCore {
    divider: TickDivider,
    blanking: BlankingDetector,
    audio: AudioSynthesizer,
    keyboard: KeyboardToggleController,
    ticks: u64,
    in_reset: bool,
}

impl PongCore {
    /// Create a core in its reset state with the default key layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a core using the config's key bindings
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "core: divisor {} ({:?}), freq {}, {} Hz tick",
            config.divider.divisor, config.divider.duty, config.audio.freq, config.tick_rate_hz
        );
        Ok(Self {
            keyboard: KeyboardToggleController::with_bindings(config.keys.clone()),
            ..Self::default()
        })
    }

    /// Reset every component
    pub fn reset(&mut self) {
        debug!("core reset after {} ticks", self.ticks);
        self.divider.reset();
        self.blanking.reset();
        self.audio.reset();
        self.keyboard.reset();
        self.ticks = 0;
    }

    /// Advance one master tick
    pub fn tick(&mut self, inputs: &CoreInputs) -> CoreOutputs {
        if inputs.reset {
            if !self.in_reset {
                self.reset();
                self.in_reset = true;
            }
            return self.outputs();
        }
        self.in_reset = false;

        let derived_enable = self.divider.period_pulse();
        let derived_tick = self.divider.tick(inputs.divisor, inputs.duty);
        if derived_enable {
            self.blanking.tick(inputs.hsync, inputs.vsync);
        }
        let sample = self
            .audio
            .tick(inputs.freq, inputs.vol_left, inputs.vol_right);
        let controls = self.keyboard.tick(inputs.scan_index, inputs.pressed_low);
        self.ticks += 1;

        CoreOutputs {
            derived_tick,
            h_blank: self.blanking.h_blank(),
            v_blank: self.blanking.v_blank(),
            sample,
            controls,
        }
    }

    /// Current registered outputs
    pub fn outputs(&self) -> CoreOutputs {
        CoreOutputs {
            derived_tick: self.divider.output(),
            h_blank: self.blanking.h_blank(),
            v_blank: self.blanking.v_blank(),
            sample: self.audio.output(),
            controls: self.keyboard.outputs(),
        }
    }

    /// Master ticks since the last reset
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Divider state
    pub fn divider(&self) -> &TickDivider {
        &self.divider
    }

    /// Blanking detector state
    pub fn blanking(&self) -> &BlankingDetector {
        &self.blanking
    }

    /// Synthesizer state
    pub fn audio(&self) -> &AudioSynthesizer {
        &self.audio
    }

    /// Keyboard controller state
    pub fn keyboard(&self) -> &KeyboardToggleController {
        &self.keyboard
    }
}
