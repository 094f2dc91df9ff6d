//! Key bindings and key naming
//!
//! Scan positions follow the console's keyboard layout: digits `0`-`9` at
//! indices 0-9, letters `A`-`Z` at 10-35, space at 36, enter at 37. The
//! remaining positions up to 79 are unlabelled and addressed as `#NN`.

use super::game::Game;
use super::key_table::SCAN_POSITIONS;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Scan index of the first letter key (`A`)
pub const KEY_A: u8 = 10;
/// Scan index of the space bar
pub const KEY_SPACE: u8 = 36;
/// Scan index of the enter key
pub const KEY_ENTER: u8 = 37;

/// Scan index for a key name
///
/// Accepts a single digit or letter (case-insensitive), `space`, `enter`,
/// or a raw index written `#NN`.
pub fn key_index(name: &str) -> Option<u8> {
    let name = name.trim();
    if let Some(raw) = name.strip_prefix('#') {
        return raw
            .parse::<u8>()
            .ok()
            .filter(|&i| usize::from(i) < SCAN_POSITIONS);
    }
    match name.to_ascii_lowercase().as_str() {
        "space" => return Some(KEY_SPACE),
        "enter" => return Some(KEY_ENTER),
        _ => {}
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ '0'..='9'), None) => Some(c as u8 - b'0'),
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(KEY_A + (c.to_ascii_uppercase() as u8 - b'A'))
        }
        _ => None,
    }
}

/// Display name for a scan index
pub fn key_name(index: u8) -> String {
    match index {
        0..=9 => char::from(b'0' + index).to_string(),
        10..=35 => char::from(b'A' + (index - KEY_A)).to_string(),
        KEY_SPACE => "space".to_string(),
        KEY_ENTER => "enter".to_string(),
        _ => format!("#{index}"),
    }
}

/// Scan index bound to each control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Toggles manual serve mode (`M`)
    pub manual_serve: u8,
    /// Toggles paddle size (`P`)
    pub paddle_size: u8,
    /// Toggles ball speed (`B`)
    pub ball_speed: u8,
    /// Toggles ball angle (`A`)
    pub ball_angle: u8,
    /// Serves while manual serve is on (space)
    pub serve: u8,
    /// Game keys in [`Game::ALL`] order (`1`-`6`)
    pub games: [u8; 6],
    /// Clears the game selection (`0`)
    pub deselect: u8,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            manual_serve: KEY_A + 12,
            paddle_size: KEY_A + 15,
            ball_speed: KEY_A + 1,
            ball_angle: KEY_A,
            serve: KEY_SPACE,
            games: [1, 2, 3, 4, 5, 6],
            deselect: 0,
        }
    }
}

impl KeyBindings {
    /// Key selecting `game`
    #[inline]
    pub fn game_key(&self, game: Game) -> u8 {
        self.games[game as usize]
    }

    /// Every binding with a label, in evaluation order
    pub fn labelled(&self) -> Vec<(String, u8)> {
        let mut keys = vec![
            ("manual_serve".to_string(), self.manual_serve),
            ("paddle_size".to_string(), self.paddle_size),
            ("ball_speed".to_string(), self.ball_speed),
            ("ball_angle".to_string(), self.ball_angle),
            ("serve".to_string(), self.serve),
        ];
        keys.extend(
            Game::ALL
                .iter()
                .map(|&game| (format!("game {game}"), self.game_key(game))),
        );
        keys.push(("deselect".to_string(), self.deselect));
        keys
    }

    /// Check every index is in range and no key is bound twice
    pub fn validate(&self) -> Result<()> {
        let keys = self.labelled();
        for (i, (label, key)) in keys.iter().enumerate() {
            if usize::from(*key) >= SCAN_POSITIONS {
                return Err(CoreError::ConfigError(format!(
                    "{label} bound to scan index {key}, must be below {SCAN_POSITIONS}"
                )));
            }
            if let Some((other, _)) = keys[..i].iter().find(|(_, k)| k == key) {
                return Err(CoreError::ConfigError(format!(
                    "key {} bound to both {other} and {label}",
                    key_name(*key)
                )));
            }
        }
        Ok(())
    }
}
