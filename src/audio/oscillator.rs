//! Step generator and quadrature oscillator
//!
//! The step generator is a 16-bit phase accumulator whose carry out gates the
//! oscillator. The oscillator is a fixed-point coupled recurrence (a leapfrog
//! integrator of simple harmonic motion) with a rotation of roughly 1/256
//! radian per step.

use crate::bits::{add_with_carry, high_byte_signed};

/// Oscillator x register after reset
pub const RESET_X: i16 = 0x7C00;
/// Oscillator y register after reset
pub const RESET_Y: i16 = 0;

/// 16-bit phase accumulator producing a carry pulse train
///
/// Pulse rate is `freq / 65536` of the tick rate.
#[derive(Debug, Clone, Default)]
pub struct PhaseAccumulator {
    accumulator: u16,
    step_pulse: bool,
}

impl PhaseAccumulator {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `freq` and latch the carry out as the step pulse
    #[inline]
    pub fn tick(&mut self, freq: u16) -> bool {
        let (sum, carry) = add_with_carry(self.accumulator, freq);
        self.accumulator = sum;
        self.step_pulse = carry;
        carry
    }

    /// Step pulse latched on the most recent tick
    #[inline]
    pub fn step_pulse(&self) -> bool {
        self.step_pulse
    }

    /// Current accumulator value
    #[inline]
    pub fn accumulator(&self) -> u16 {
        self.accumulator
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Coupled-recurrence sine/cosine oscillator
///
/// `x` and `y` circle close to a fixed radius. The 8-bit shifts floor toward
/// negative infinity, which makes the orbit slightly non-circular; that shape
/// is part of the output and must not be "corrected".
#[derive(Debug, Clone)]
pub struct QuadratureOscillator {
    x: i16,
    y: i16,
}

impl QuadratureOscillator {
    /// Create an oscillator at its reset point `(0x7C00, 0)`
    pub fn new() -> Self {
        Self {
            x: RESET_X,
            y: RESET_Y,
        }
    }

    /// Advance one step
    ///
    /// `nx = x + sext(y[15:8])`, then `ny = y - sext(nx[15:8])`.
    #[inline]
    pub fn step(&mut self) {
        let nx = self.x.wrapping_add(high_byte_signed(self.y));
        let ny = self.y.wrapping_sub(high_byte_signed(nx));
        self.x = nx;
        self.y = ny;
    }

    /// Current x (cosine-like) output
    #[inline]
    pub fn x(&self) -> i16 {
        self.x
    }

    /// Current y (sine-like) output
    #[inline]
    pub fn y(&self) -> i16 {
        self.y
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for QuadratureOscillator {
    fn default() -> Self {
        Self::new()
    }
}

/// Oscillator steps per full cycle
///
/// The recurrence rotates by `theta` where `2 - 2cos(theta) = (1/256)^2`.
pub fn steps_per_cycle() -> f64 {
    let e = 1.0 / 256.0;
    let theta = (1.0 - e * e / 2.0_f64).acos();
    std::f64::consts::TAU / theta
}

/// Audible frequency produced for a given tick rate and `freq` input
pub fn tone_frequency_hz(tick_rate_hz: f64, freq: u16) -> f64 {
    let step_rate = tick_rate_hz * f64::from(freq) / 65_536.0;
    step_rate / steps_per_cycle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accumulator_carry_rate() {
        let mut acc = PhaseAccumulator::new();
        let pulses = (0..65_536).filter(|_| acc.tick(256)).count();
        assert_eq!(pulses, 256);
        assert_eq!(acc.accumulator(), 0);
    }

    #[test]
    fn test_accumulator_zero_freq_never_steps() {
        let mut acc = PhaseAccumulator::new();
        assert!((0..10_000).all(|_| !acc.tick(0)));
    }

    #[test]
    fn test_accumulator_max_freq() {
        let mut acc = PhaseAccumulator::new();
        // 0 + 0xFFFF has no carry, every following add does
        assert!(!acc.tick(0xFFFF));
        assert!(acc.tick(0xFFFF));
        assert!(acc.step_pulse());
        assert_eq!(acc.accumulator(), 0xFFFE);
    }

    #[test]
    fn test_first_step_from_reset() {
        let mut osc = QuadratureOscillator::new();
        osc.step();
        // y is 0 so x is unchanged; y moves by -(0x7C00 >> 8)
        assert_eq!(osc.x(), 0x7C00);
        assert_eq!(osc.y(), -0x7C);
        osc.step();
        assert_eq!(osc.x(), 0x7C00 - 1);
        assert_eq!(osc.y(), -0x7C - 0x7B);
    }

    #[test]
    fn test_orbit_stays_in_16_bit_range() {
        let mut osc = QuadratureOscillator::new();
        let (mut x, mut y) = (i32::from(RESET_X), i32::from(RESET_Y));
        for step in 0..200_000 {
            // Unbounded reference with the same floor semantics
            x += y >> 8;
            y -= x >> 8;
            assert!(
                (i32::from(i16::MIN)..=i32::from(i16::MAX)).contains(&x)
                    && (i32::from(i16::MIN)..=i32::from(i16::MAX)).contains(&y),
                "left 16-bit range at step {step}: ({x}, {y})"
            );
            osc.step();
            assert_eq!((i32::from(osc.x()), i32::from(osc.y())), (x, y));
        }
    }

    #[test]
    fn test_cycle_length() {
        let mut osc = QuadratureOscillator::new();
        let mut crossings = Vec::new();
        let mut prev = osc.x();
        for step in 0..200_000u32 {
            osc.step();
            if prev >= 0 && osc.x() < 0 {
                crossings.push(step);
            }
            prev = osc.x();
        }
        let cycles = (crossings.len() - 1) as f64;
        let span = f64::from(crossings[crossings.len() - 1] - crossings[0]);
        assert_relative_eq!(span / cycles, steps_per_cycle(), max_relative = 0.01);
    }

    #[test]
    fn test_tone_frequency() {
        let hz = tone_frequency_hz(1_608_000.0, 65_535);
        assert_relative_eq!(hz, 1_000.0, max_relative = 0.01);
        assert_eq!(tone_frequency_hz(1_000_000.0, 0), 0.0);
    }
}
