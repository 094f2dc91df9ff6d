//! Blanking interval detection
//!
//! Counts derived ticks between sync edges and raises the horizontal and
//! vertical blanking levels at fixed counter values of the target video mode.
//!
//! Thresholds are matched with equality, not range checks. If the counters
//! ever skip a threshold value (sync lost, divisor changed mid-line) the
//! corresponding blanking output stays latched in its last state until the
//! value comes around again. That behaviour is kept as-is; use
//! [`BlankingDetector::counters`] to observe it.

use crate::bits::inc_10;

/// Horizontal count at which `h_blank` is cleared
pub const H_BLANK_END: u16 = 21;
/// Horizontal count at which `h_blank` is set
pub const H_BLANK_START: u16 = 100;
/// Vertical count at which `v_blank` is cleared
pub const V_BLANK_END: u16 = 34;
/// Vertical count at which `v_blank` is set
pub const V_BLANK_START: u16 = 240;

/// Snapshot of the detector registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlankCounters {
    /// Derived ticks since the last hsync falling edge (10-bit)
    pub h_count: u16,
    /// Lines since the last vsync falling edge (10-bit)
    pub v_count: u16,
    /// hsync level sampled on the previous derived tick
    pub prev_hsync: bool,
    /// vsync level sampled on the previous hsync falling edge
    pub prev_vsync: bool,
    /// Horizontal blanking level
    pub h_blank: bool,
    /// Vertical blanking level
    pub v_blank: bool,
}

/// Sync-edge driven blanking detector
#[derive(Debug, Clone, Default)]
pub struct BlankingDetector {
    regs: BlankCounters,
}

impl BlankingDetector {
    /// Create a detector with all counters and outputs cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.regs = BlankCounters::default();
    }

    /// Advance one derived tick
    ///
    /// Only call this on ticks where the derived clock is active; the
    /// detector has no notion of the master tick.
    pub fn tick(&mut self, hsync: bool, vsync: bool) {
        let prev = self.regs;
        let mut next = prev;

        next.h_count = inc_10(prev.h_count);

        if prev.prev_hsync && !hsync {
            next.h_count = 0;
            next.v_count = inc_10(prev.v_count);
            if prev.prev_vsync && !vsync {
                next.v_count = 0;
            }
            next.prev_vsync = vsync;
        }
        next.prev_hsync = hsync;

        // Compared against the counters as latched at the start of the tick
        if prev.h_count == H_BLANK_END {
            next.h_blank = false;
        }
        if prev.h_count == H_BLANK_START {
            next.h_blank = true;
        }
        if prev.v_count == V_BLANK_END {
            next.v_blank = false;
        }
        if prev.v_count == V_BLANK_START {
            next.v_blank = true;
        }

        self.regs = next;
    }

    /// Horizontal blanking level
    #[inline]
    pub fn h_blank(&self) -> bool {
        self.regs.h_blank
    }

    /// Vertical blanking level
    #[inline]
    pub fn v_blank(&self) -> bool {
        self.regs.v_blank
    }

    /// Full register snapshot, including the raw counters
    #[inline]
    pub fn counters(&self) -> BlankCounters {
        self.regs
    }
}
