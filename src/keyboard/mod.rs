//! Keyboard scan to game controls
//!
//! An external scanner presents one key position per tick. The controller
//! keeps the latest level of every position in a [`KeyTable`] and derives
//! the console's sticky controls from it:
//! - four hold-to-toggle latches (manual serve, paddle size, ball speed,
//!   ball angle) that flip once per physical press
//! - a level-sensitive serve line, active only in manual serve mode
//! - a one-hot (active low) game select field
//!
//! Every decision in a tick reads the table and latches as they stood at the
//! start of that tick; the scanned level lands in the table afterwards.

pub mod bindings;
pub mod game;
pub mod key_table;

pub use bindings::{key_index, key_name, KeyBindings};
pub use game::{Game, GameLines, GameSelect};
pub use key_table::{KeyTable, SCAN_POSITIONS};

use log::trace;

/// Edge-triggered toggle with re-trigger suppression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoldToggle {
    output: bool,
    held: bool,
}

impl HoldToggle {
    /// Create a toggle with the given initial output
    pub const fn new(output: bool) -> Self {
        Self {
            output,
            held: false,
        }
    }

    /// Feed the current key state; returns true when the output flipped
    #[inline]
    pub fn update(&mut self, pressed: bool) -> bool {
        if !pressed {
            self.held = false;
            false
        } else if !self.held {
            self.output = !self.output;
            self.held = true;
            true
        } else {
            false
        }
    }

    /// Toggle output
    #[inline]
    pub fn output(&self) -> bool {
        self.output
    }

    /// Whether the key is still held since the last flip
    #[inline]
    pub fn held(&self) -> bool {
        self.held
    }
}

/// Control lines presented to the game chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOutputs {
    /// Manual serve mode (on after reset)
    pub manual_serve: bool,
    /// Serve key active while in manual serve mode
    pub serve: bool,
    /// Small paddles (large after reset)
    pub paddle_small: bool,
    /// Fast ball (normal after reset)
    pub ball_fast: bool,
    /// Steep ball angles (normal after reset)
    pub angle_steep: bool,
    /// Game select lines (tennis after reset)
    pub game_select: GameSelect,
}

impl Default for ControlOutputs {
    fn default() -> Self {
        Self {
            manual_serve: true,
            serve: false,
            paddle_small: false,
            ball_fast: false,
            angle_steep: false,
            game_select: GameSelect::default(),
        }
    }
}

/// Keyboard scan state machine
#[derive(Debug, Clone)]
pub struct KeyboardToggleController {
    bindings: KeyBindings,
    table: KeyTable,
    manual_serve: HoldToggle,
    paddle_size: HoldToggle,
    ball_speed: HoldToggle,
    ball_angle: HoldToggle,
    serve: bool,
    game_select: GameSelect,
}

impl KeyboardToggleController {
    /// Create a controller with the default key layout
    pub fn new() -> Self {
        Self::with_bindings(KeyBindings::default())
    }

    /// Create a controller with custom key bindings
    ///
    /// Bindings are expected to have passed [`KeyBindings::validate`].
    pub fn with_bindings(bindings: KeyBindings) -> Self {
        let defaults = ControlOutputs::default();
        Self {
            bindings,
            table: KeyTable::new(),
            manual_serve: HoldToggle::new(defaults.manual_serve),
            paddle_size: HoldToggle::new(defaults.paddle_small),
            ball_speed: HoldToggle::new(defaults.ball_fast),
            ball_angle: HoldToggle::new(defaults.angle_steep),
            serve: defaults.serve,
            game_select: defaults.game_select,
        }
    }

    /// Reset latches and key table, keeping the bindings
    pub fn reset(&mut self) {
        let bindings = std::mem::take(&mut self.bindings);
        *self = Self::with_bindings(bindings);
    }

    /// Advance one tick with the scanner's current position and level
    ///
    /// `pressed_low` is active low: `false` means the key at `scan_index`
    /// is down. `scan_index` must be below [`SCAN_POSITIONS`].
    pub fn tick(&mut self, scan_index: usize, pressed_low: bool) -> ControlOutputs {
        let keys = &self.table;
        let bind = &self.bindings;
        let was_manual = self.manual_serve.output();
        let was_selected = self.game_select;
        let down = |key: u8| keys.is_pressed(usize::from(key));

        if self.manual_serve.update(down(bind.manual_serve)) {
            trace!("manual serve -> {}", self.manual_serve.output());
        }
        if self.paddle_size.update(down(bind.paddle_size)) {
            trace!("paddle small -> {}", self.paddle_size.output());
        }
        if self.ball_speed.update(down(bind.ball_speed)) {
            trace!("ball fast -> {}", self.ball_speed.output());
        }
        if self.ball_angle.update(down(bind.ball_angle)) {
            trace!("angle steep -> {}", self.ball_angle.output());
        }

        self.serve = was_manual && down(bind.serve);

        // Later keys in table order override earlier ones
        let mut next = was_selected;
        for game in Game::ALL {
            if down(bind.game_key(game)) && !was_selected.is_selected(game) {
                next = GameSelect::only(game);
            }
        }
        if down(bind.deselect) && !was_selected.is_none() {
            next = GameSelect::none();
        }
        if next != was_selected {
            trace!("game select {} -> {}", was_selected, next);
        }
        self.game_select = next;

        self.table.write(scan_index, pressed_low);
        self.outputs()
    }

    /// Current control outputs
    pub fn outputs(&self) -> ControlOutputs {
        ControlOutputs {
            manual_serve: self.manual_serve.output(),
            serve: self.serve,
            paddle_small: self.paddle_size.output(),
            ball_fast: self.ball_speed.output(),
            angle_steep: self.ball_angle.output(),
            game_select: self.game_select,
        }
    }

    /// Live key table
    #[inline]
    pub fn key_table(&self) -> &KeyTable {
        &self.table
    }

    /// Active key bindings
    #[inline]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }
}

impl Default for KeyboardToggleController {
    fn default() -> Self {
        Self::new()
    }
}
