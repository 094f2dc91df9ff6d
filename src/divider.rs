//! Master tick divider
//!
//! Produces a slower, phase-locked tick train from the master tick. The
//! divisor is a live input re-read on every tick, and the output either
//! approximates a 50% duty clock or a one-tick strobe.

use serde::{Deserialize, Serialize};

/// Output shape of the derived tick train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyMode {
    /// Low for the first half of the period, high for the rest
    #[default]
    Half,
    /// High for exactly one tick per period
    Short,
}

/// Programmable clock-tick divider
///
/// Each period lasts `divisor + 1` master ticks. The counter is 16 bits wide
/// and wraps like the hardware register if the divisor is lowered below it.
#[derive(Debug, Clone, Default)]
pub struct TickDivider {
    counter: u16,
    half: u16,
    output: bool,
    wrapped: bool,
}

impl TickDivider {
    /// Create a divider in its reset state (counter zero, output low)
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance one master tick and return the derived tick level
    ///
    /// `divisor` must be at least 1; zero is a caller error.
    #[inline]
    pub fn tick(&mut self, divisor: u16, duty: DutyMode) -> bool {
        debug_assert!(divisor >= 1, "tick divider requires divisor >= 1");

        self.half = divisor >> 1;
        self.wrapped = false;
        if self.counter < self.half {
            self.counter = self.counter.wrapping_add(1);
            self.output = false;
        } else if self.counter == divisor {
            self.counter = 0;
            self.output = true;
            self.wrapped = true;
        } else {
            self.counter = self.counter.wrapping_add(1);
            self.output = duty == DutyMode::Half;
        }
        self.output
    }

    /// Derived tick level produced by the most recent tick
    #[inline]
    pub fn output(&self) -> bool {
        self.output
    }

    /// Whether the most recent tick closed a period
    ///
    /// High for exactly one master tick every `divisor + 1`, whatever the
    /// duty mode. In `Short` mode it matches [`output`](Self::output).
    #[inline]
    pub fn period_pulse(&self) -> bool {
        self.wrapped
    }

    /// Current counter value
    #[inline]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Half-period threshold computed on the most recent tick
    #[inline]
    pub fn half(&self) -> u16 {
        self.half
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(divisor: u16, duty: DutyMode, ticks: usize) -> Vec<bool> {
        let mut divider = TickDivider::new();
        (0..ticks).map(|_| divider.tick(divisor, duty)).collect()
    }

    #[test]
    fn test_reset_state() {
        let mut divider = TickDivider::new();
        divider.tick(5, DutyMode::Half);
        divider.tick(5, DutyMode::Half);
        divider.reset();
        assert_eq!(divider.counter(), 0);
        assert!(!divider.output());
    }

    #[test]
    fn test_short_mode_pulses() {
        let out = run(8, DutyMode::Short, 20);
        let pulses: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, level)| **level)
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(pulses, vec![9, 18]);
    }

    #[test]
    fn test_half_mode_period_and_low_phase() {
        for divisor in 1u16..=31 {
            let period = divisor as usize + 1;
            let out = run(divisor, DutyMode::Half, period * 4);
            for cycle in out.chunks(period) {
                let low = cycle.iter().take_while(|&&level| !level).count();
                assert_eq!(low, (divisor / 2) as usize, "divisor {divisor}");
                assert!(cycle[low..].iter().all(|&level| level), "divisor {divisor}");
            }
        }
    }

    #[test]
    fn test_divisor_24_half_duty() {
        let out = run(24, DutyMode::Half, 50);
        assert!(out[..12].iter().all(|&l| !l));
        assert!(out[12..25].iter().all(|&l| l));
        assert!(out[25..37].iter().all(|&l| !l));
    }

    #[test]
    fn test_period_pulse_once_per_period() {
        for duty in [DutyMode::Half, DutyMode::Short] {
            for divisor in 1u16..=31 {
                let mut divider = TickDivider::new();
                let period = divisor as usize + 1;
                let pulses = (0..period * 10)
                    .filter(|_| {
                        let level = divider.tick(divisor, duty);
                        if duty == DutyMode::Short {
                            assert_eq!(level, divider.period_pulse());
                        }
                        divider.period_pulse()
                    })
                    .count();
                assert_eq!(pulses, 10, "divisor {divisor} {duty:?}");
            }
        }
    }

    #[test]
    fn test_counter_never_exceeds_divisor() {
        let mut divider = TickDivider::new();
        for _ in 0..1_000 {
            divider.tick(13, DutyMode::Short);
            assert!(divider.counter() <= 13);
        }
    }

    #[test]
    fn test_live_divisor_change_takes_effect() {
        let mut divider = TickDivider::new();
        for _ in 0..3 {
            divider.tick(20, DutyMode::Short);
        }
        // Counter is 3; a divisor of 3 fires on the very next tick
        assert!(divider.tick(3, DutyMode::Short));
        assert_eq!(divider.counter(), 0);
    }
}
