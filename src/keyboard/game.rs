//! Game selection lines
//!
//! The AY-3-8500 takes its game choice on six active-low select inputs: the
//! selected game's line is pulled low and the others stay high. All lines
//! high means no game. [`Game`] names the games and [`GameLines`] holds the
//! fixed game-to-bit table, so no code indexes the field by hand.

use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Game select lines (bit set = line high = not selected)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GameLines: u8 {
        /// Tennis
        const TENNIS = 0x01;
        /// Soccer (hockey)
        const SOCCER = 0x02;
        /// Squash
        const SQUASH = 0x04;
        /// Practice (solo squash)
        const PRACTICE = 0x08;
        /// Rifle game 1
        const RIFLE_1 = 0x10;
        /// Rifle game 2
        const RIFLE_2 = 0x20;
    }
}

/// Games selectable on the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    /// Tennis
    Tennis = 0,
    /// Soccer (hockey)
    Soccer = 1,
    /// Squash
    Squash = 2,
    /// Practice
    Practice = 3,
    /// Rifle game 1
    Rifle1 = 4,
    /// Rifle game 2
    Rifle2 = 5,
}

impl Game {
    /// All games in select-line order
    pub const ALL: [Game; 6] = [
        Game::Tennis,
        Game::Soccer,
        Game::Squash,
        Game::Practice,
        Game::Rifle1,
        Game::Rifle2,
    ];

    /// Select line driven low for this game
    pub fn line(self) -> GameLines {
        match self {
            Game::Tennis => GameLines::TENNIS,
            Game::Soccer => GameLines::SOCCER,
            Game::Squash => GameLines::SQUASH,
            Game::Practice => GameLines::PRACTICE,
            Game::Rifle1 => GameLines::RIFLE_1,
            Game::Rifle2 => GameLines::RIFLE_2,
        }
    }

    /// Game for a select-line bit position (0-5)
    pub fn from_index(index: u32) -> Option<Game> {
        Game::from_u32(index)
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            Game::Tennis => "tennis",
            Game::Soccer => "soccer",
            Game::Squash => "squash",
            Game::Practice => "practice",
            Game::Rifle1 => "rifle1",
            Game::Rifle2 => "rifle2",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The six-line game select field (at most one line low)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSelect(GameLines);

impl GameSelect {
    /// All lines high: no game selected
    pub fn none() -> Self {
        GameSelect(GameLines::all())
    }

    /// Only `game`'s line low
    pub fn only(game: Game) -> Self {
        GameSelect(GameLines::all().difference(game.line()))
    }

    /// Whether `game` is the selected game
    pub fn is_selected(self, game: Game) -> bool {
        !self.0.contains(game.line())
    }

    /// Whether every line is high
    pub fn is_none(self) -> bool {
        self.0 == GameLines::all()
    }

    /// The selected game, if any
    pub fn selected(self) -> Option<Game> {
        let low = GameLines::all().difference(self.0).bits();
        if low.count_ones() == 1 {
            Game::from_index(low.trailing_zeros())
        } else {
            None
        }
    }

    /// Raw 6-bit line levels
    pub fn bits(self) -> u8 {
        self.0.bits()
    }

    /// Line levels as flags
    pub fn lines(self) -> GameLines {
        self.0
    }

    /// All-high or exactly one line low
    pub fn is_well_formed(self) -> bool {
        (!self.0.bits() & 0x3F).count_ones() <= 1
    }
}

impl Default for GameSelect {
    /// Tennis selected
    fn default() -> Self {
        GameSelect::only(Game::Tennis)
    }
}

impl fmt::Display for GameSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selected() {
            Some(game) => write!(f, "{game}"),
            None => f.write_str("none"),
        }
    }
}
