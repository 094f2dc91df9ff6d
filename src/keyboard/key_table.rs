//! Live key-state table
//!
//! The external scanner walks all 80 key positions, one per tick, and the
//! table keeps the most recent level seen for each. Levels are active low:
//! `false` means the key is down.

/// Number of scan positions
pub const SCAN_POSITIONS: usize = 80;

/// Per-position key levels, written one entry per tick
#[derive(Debug, Clone)]
pub struct KeyTable {
    levels: [bool; SCAN_POSITIONS],
}

impl KeyTable {
    /// Create a table with every key released
    pub fn new() -> Self {
        Self {
            levels: [true; SCAN_POSITIONS],
        }
    }

    /// Store the level seen at `index`
    ///
    /// Indices outside `0..80` violate the scanner contract; they trip a
    /// debug assertion and are otherwise dropped.
    #[inline]
    pub fn write(&mut self, index: usize, pressed_low: bool) {
        debug_assert!(index < SCAN_POSITIONS, "scan index {index} out of range");
        if let Some(level) = self.levels.get_mut(index) {
            *level = pressed_low;
        }
    }

    /// Raw active-low level at `index`
    #[inline]
    pub fn level(&self, index: usize) -> bool {
        self.levels.get(index).copied().unwrap_or(true)
    }

    /// Whether the key at `index` is currently down
    #[inline]
    pub fn is_pressed(&self, index: usize) -> bool {
        !self.level(index)
    }

    /// Number of keys currently down
    pub fn pressed_count(&self) -> usize {
        self.levels.iter().filter(|&&level| !level).count()
    }

    /// Release every key
    pub fn reset(&mut self) {
        self.levels = [true; SCAN_POSITIONS];
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new()
    }
}
