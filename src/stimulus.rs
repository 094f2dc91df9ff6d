//! Synthetic sync and key-scan sources
//!
//! The console wrapper normally supplies sync pulses from the video timing
//! chain and key levels from a hardware scanner. These generators stand in
//! for both so the core can be driven from the CLI, tests and benches.

use crate::blanking::{H_BLANK_START, V_BLANK_START};
use crate::keyboard::{key_index, key_name, SCAN_POSITIONS};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync pulse layout, counted in derived ticks and lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoTiming {
    /// Derived ticks per line
    pub h_period: u16,
    /// hsync pulse width at the start of each line
    pub h_sync_width: u16,
    /// Lines per frame
    pub lines: u16,
    /// vsync pulse length at the start of each frame, in lines
    pub v_sync_lines: u16,
}

impl Default for VideoTiming {
    fn default() -> Self {
        Self {
            h_period: 228,
            h_sync_width: 17,
            lines: 262,
            v_sync_lines: 3,
        }
    }
}

impl VideoTiming {
    /// Derived ticks per frame
    pub fn ticks_per_frame(&self) -> u32 {
        u32::from(self.h_period) * u32::from(self.lines)
    }

    /// Whether the detector counters reach every blanking threshold
    ///
    /// Lines shorter than the horizontal start threshold (or frames shorter
    /// than the vertical one) leave the blanking outputs stuck.
    pub fn reaches_thresholds(&self) -> bool {
        self.h_period > H_BLANK_START && self.lines > V_BLANK_START
    }

    /// Check pulse widths fit inside their periods
    pub fn validate(&self) -> Result<()> {
        if self.h_sync_width == 0 || self.h_sync_width >= self.h_period {
            return Err(CoreError::ConfigError(format!(
                "h_sync_width {} must be in 1..{}",
                self.h_sync_width, self.h_period
            )));
        }
        if self.v_sync_lines == 0 || self.v_sync_lines >= self.lines {
            return Err(CoreError::ConfigError(format!(
                "v_sync_lines {} must be in 1..{}",
                self.v_sync_lines, self.lines
            )));
        }
        Ok(())
    }
}

/// Active-high hsync/vsync source advanced once per derived tick
#[derive(Debug, Clone)]
pub struct SyncGenerator {
    timing: VideoTiming,
    h: u16,
    line: u16,
}

impl SyncGenerator {
    /// Start at the first tick of the first line
    pub fn new(timing: VideoTiming) -> Self {
        Self {
            timing,
            h: 0,
            line: 0,
        }
    }

    /// Current `(hsync, vsync)` levels
    #[inline]
    pub fn levels(&self) -> (bool, bool) {
        (
            self.h < self.timing.h_sync_width,
            self.line < self.timing.v_sync_lines,
        )
    }

    /// Move to the next derived tick
    #[inline]
    pub fn advance(&mut self) {
        self.h += 1;
        if self.h >= self.timing.h_period {
            self.h = 0;
            self.line += 1;
            if self.line >= self.timing.lines {
                self.line = 0;
            }
        }
    }

    /// Current `(tick in line, line)` position
    pub fn position(&self) -> (u16, u16) {
        (self.h, self.line)
    }

    /// Timing in use
    pub fn timing(&self) -> &VideoTiming {
        &self.timing
    }

    /// Return to the start of the frame
    pub fn reset(&mut self) {
        self.h = 0;
        self.line = 0;
    }
}

/// Key matrix the scanner reads, `true` meaning held down
#[derive(Debug, Clone)]
pub struct KeyMatrix {
    down: [bool; SCAN_POSITIONS],
}

impl KeyMatrix {
    /// All keys up
    pub fn new() -> Self {
        Self {
            down: [false; SCAN_POSITIONS],
        }
    }

    /// Hold a key down
    pub fn press(&mut self, key: u8) {
        if let Some(k) = self.down.get_mut(usize::from(key)) {
            *k = true;
        }
    }

    /// Let a key up
    pub fn release(&mut self, key: u8) {
        if let Some(k) = self.down.get_mut(usize::from(key)) {
            *k = false;
        }
    }

    /// Whether a key is held
    pub fn is_down(&self, key: usize) -> bool {
        self.down.get(key).copied().unwrap_or(false)
    }
}

impl Default for KeyMatrix {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin scanner over a [`KeyMatrix`]
#[derive(Debug, Clone, Default)]
pub struct KeyScanner {
    matrix: KeyMatrix,
    position: usize,
}

impl KeyScanner {
    /// Scanner starting at position 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `(scan_index, pressed_low)` for this tick and move on
    #[inline]
    pub fn scan(&mut self) -> (usize, bool) {
        let index = self.position;
        self.position = (self.position + 1) % SCAN_POSITIONS;
        (index, !self.matrix.is_down(index))
    }

    /// Matrix being scanned
    pub fn matrix(&self) -> &KeyMatrix {
        &self.matrix
    }

    /// Mutable matrix access for pressing keys
    pub fn matrix_mut(&mut self) -> &mut KeyMatrix {
        &mut self.matrix
    }

    /// Next position to be scanned
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Master ticks a `key@tick` press is held: three full scans
pub const DEFAULT_HOLD_TICKS: u64 = 3 * SCAN_POSITIONS as u64;

/// A key held over a master tick range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// Scan index
    pub key: u8,
    /// First master tick the key is down
    pub start: u64,
    /// First master tick the key is up again
    pub end: u64,
}

impl KeyPress {
    /// Parse `key@tick` or `key@start..end`
    ///
    /// Key names follow [`key_index`]. A single tick holds the key for
    /// [`DEFAULT_HOLD_TICKS`].
    pub fn parse(text: &str) -> Result<Self> {
        let (name, when) = text
            .split_once('@')
            .ok_or_else(|| CoreError::ConfigError(format!("expected key@tick, got '{text}'")))?;
        let key = key_index(name)
            .ok_or_else(|| CoreError::ConfigError(format!("unknown key '{name}'")))?;
        let tick = |s: &str| {
            s.trim()
                .parse::<u64>()
                .map_err(|e| CoreError::ConfigError(format!("bad tick '{s}': {e}")))
        };
        let (start, end) = match when.split_once("..") {
            Some((a, b)) => (tick(a)?, tick(b)?),
            None => {
                let start = tick(when)?;
                let end = start.checked_add(DEFAULT_HOLD_TICKS).ok_or_else(|| {
                    CoreError::ConfigError(format!("press at tick {start} runs past the last tick"))
                })?;
                (start, end)
            }
        };
        if end <= start {
            return Err(CoreError::ConfigError(format!(
                "empty press range {start}..{end}"
            )));
        }
        Ok(Self { key, start, end })
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", key_name(self.key), self.start, self.end)
    }
}

/// Timed key presses applied to a scanner as master ticks pass
#[derive(Debug, Clone, Default)]
pub struct PressSchedule {
    presses: Vec<KeyPress>,
}

impl PressSchedule {
    /// Build from a list of presses
    pub fn new(presses: Vec<KeyPress>) -> Self {
        Self { presses }
    }

    /// Add a press
    pub fn push(&mut self, press: KeyPress) {
        self.presses.push(press);
    }

    /// Press and release keys whose range starts or ends at `tick`
    pub fn apply(&self, tick: u64, matrix: &mut KeyMatrix) {
        for p in &self.presses {
            if tick == p.start {
                matrix.press(p.key);
            }
            if tick == p.end {
                matrix.release(p.key);
            }
        }
    }

    /// Scheduled presses
    pub fn presses(&self) -> &[KeyPress] {
        &self.presses
    }

    /// Whether nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.presses.is_empty()
    }
}
