//! AY-3-8500 Pong Console Core
//!
//! A tick-accurate emulation of the timing and signal-generation logic that
//! surrounds an AY-3-8500 "Pong" chip inside a retro-console framework. Every
//! component is a synchronous state machine advanced once per master tick,
//! so the same input history always produces the same output history.
//!
//! # Components
//! - [`TickDivider`]: programmable divider producing a derived tick train
//! - [`BlankingDetector`]: sync-edge counting horizontal/vertical blanking
//! - [`AudioSynthesizer`]: phase accumulator, quadrature oscillator and a
//!   two-stage fixed-point volume pipeline producing stereo PCM
//! - [`KeyboardToggleController`]: keyboard scan to sticky game controls
//! - [`PongCore`]: all four wired together with snapshot-isolated inputs
//!
//! # Crate feature flags
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ```
//! use ay38500::{DutyMode, TickDivider};
//!
//! let mut divider = TickDivider::new();
//! let pulses: Vec<usize> = (1..=20)
//!     .filter(|_| divider.tick(8, DutyMode::Short))
//!     .collect();
//! assert_eq!(pulses, vec![9, 18]);
//! ```
//!
//! ## Full core
//! ```
//! use ay38500::{CoreInputs, PongCore};
//!
//! let mut core = PongCore::new();
//! let inputs = CoreInputs {
//!     freq: 2_000,
//!     vol_left: 0x0800,
//!     vol_right: 0x0800,
//!     ..CoreInputs::default()
//! };
//! for _ in 0..1_000 {
//!     let out = core.tick(&inputs);
//!     let _ = out.sample.left;
//! }
//! ```

#![warn(missing_docs)]

pub mod audio; // Tone synthesis and volume pipeline
pub mod bits; // Fixed-width bit helpers
pub mod blanking; // Blanking interval detection
pub mod config; // Serializable configuration
pub mod console; // Component composition
pub mod divider; // Master tick divider
pub mod export; // WAV rendering
pub mod keyboard; // Key scan and toggle latches
pub mod session; // Stimulus-driven run loop
pub mod stimulus; // Synthetic sync and key scan sources
pub mod trace; // Per-tick CSV traces

#[cfg(feature = "streaming")]
pub mod streaming; // Audio Output & Streaming

/// Error types for the console core
///
/// Tick processing itself never fails; these errors come from the
/// configuration, export, trace and audio-device layers.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Error writing a signal trace
    #[error("Trace write error: {0}")]
    TraceError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for CoreError {
    /// Converts a String into `CoreError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `AudioFileError`, ...)
    /// when the failure has a known category.
    fn from(msg: String) -> Self {
        CoreError::Other(msg)
    }
}

impl From<&str> for CoreError {
    /// Converts a string slice into `CoreError::Other`.
    fn from(msg: &str) -> Self {
        CoreError::Other(msg.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

// Public API exports
pub use audio::{AudioSynthesizer, StereoSample};
pub use blanking::{BlankCounters, BlankingDetector};
pub use config::CoreConfig;
pub use console::{CoreInputs, CoreOutputs, PongCore};
pub use divider::{DutyMode, TickDivider};
pub use keyboard::{ControlOutputs, Game, GameSelect, KeyBindings, KeyboardToggleController};

#[cfg(feature = "streaming")]
pub use streaming::{AudioDevice, RingBuffer, StreamConfig};
