//! Live audio playback
//!
//! The producer runs the core and pushes decimated stereo frames into a
//! [`RingBuffer`]; the [`AudioDevice`] drains it from rodio's playback
//! thread. Memory use is fixed by the ring buffer size.

pub mod audio_device;
pub mod ring_buffer;

pub use audio_device::AudioDevice;
pub use ring_buffer::RingBuffer;

use crate::audio::StereoSample;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Buffer backoff time in microseconds
pub const BUFFER_BACKOFF_MICROS: u64 = 100;

/// Configuration for streaming playback
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Size of the ring buffer in interleaved samples
    pub ring_buffer_size: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl StreamConfig {
    /// Small buffer: 4096 samples, about 46ms of stereo at 44.1kHz
    pub fn low_latency(sample_rate: u32) -> Self {
        StreamConfig {
            ring_buffer_size: 4096,
            sample_rate,
        }
    }

    /// Large buffer: 16384 samples, about 186ms of stereo at 44.1kHz
    pub fn stable(sample_rate: u32) -> Self {
        StreamConfig {
            ring_buffer_size: 16384,
            sample_rate,
        }
    }

    /// Channels played (always stereo)
    pub fn channels(&self) -> u16 {
        2
    }

    /// Buffer latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        let frames = self.ring_buffer_size as f32 / f32::from(self.channels());
        frames / self.sample_rate as f32 * 1000.0
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::stable(44_100)
    }
}

/// Convert a stereo frame to interleaved `f32` in `[-1, 1)`
#[inline]
pub fn frame_to_f32(frame: StereoSample) -> [f32; 2] {
    [
        f32::from(frame.left) / 32_768.0,
        f32::from(frame.right) / 32_768.0,
    ]
}

/// Write interleaved samples, backing off while the buffer is full
///
/// Returns once every sample has been queued.
pub fn write_blocking(buffer: &Arc<Mutex<RingBuffer>>, samples: &[f32]) {
    let mut remaining = samples;
    while !remaining.is_empty() {
        let written = buffer.lock().write(remaining);
        if written == 0 {
            std::thread::sleep(Duration::from_micros(BUFFER_BACKOFF_MICROS));
        } else {
            remaining = &remaining[written..];
        }
    }
}
