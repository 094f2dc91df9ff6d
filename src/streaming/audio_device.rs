//! Audio device integration using rodio

use super::{RingBuffer, StreamConfig};
use crate::{CoreError, Result};
use log::debug;
use parking_lot::Mutex;
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Samples pulled from the ring buffer per lock
const BATCH: usize = 4096;

/// rodio source draining the ring buffer
struct RingBufferSource {
    ring_buffer: Arc<Mutex<RingBuffer>>,
    sample_rate: u32,
    channels: u16,
    finished: Arc<AtomicBool>,
    buffer: Vec<f32>,
    buffer_pos: usize,
    buffer_len: usize,
}

impl RingBufferSource {
    fn new(
        ring_buffer: Arc<Mutex<RingBuffer>>,
        sample_rate: u32,
        channels: u16,
        finished: Arc<AtomicBool>,
    ) -> Self {
        RingBufferSource {
            ring_buffer,
            sample_rate,
            channels,
            finished,
            buffer: vec![0.0; BATCH],
            buffer_pos: 0,
            buffer_len: 0,
        }
    }
}

impl Source for RingBufferSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for RingBufferSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.buffer_pos >= self.buffer_len {
            // Keep whole frames so channels never swap on a partial read
            let want = BATCH - BATCH % usize::from(self.channels.max(1));
            let read = self.ring_buffer.lock().read(&mut self.buffer[..want]);
            if read == 0 {
                if self.finished.load(Ordering::Relaxed) {
                    return None;
                }
                // Underrun: one frame of silence keeps the stream alive
                self.buffer[..usize::from(self.channels)].fill(0.0);
                self.buffer_len = usize::from(self.channels);
            } else {
                self.buffer_len = read;
            }
            self.buffer_pos = 0;
        }

        let sample = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        Some(sample)
    }
}

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output and start draining `ring_buffer`
    pub fn new(config: &StreamConfig, ring_buffer: Arc<Mutex<RingBuffer>>) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| CoreError::AudioDeviceError(format!("Failed to open output: {e}")))?;
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| CoreError::AudioDeviceError(format!("Failed to create sink: {e}")))?;

        let finished = Arc::new(AtomicBool::new(false));
        sink.append(RingBufferSource::new(
            ring_buffer,
            config.sample_rate,
            config.channels(),
            Arc::clone(&finished),
        ));
        debug!(
            "audio device open: {} Hz, {:.0} ms buffer",
            config.sample_rate,
            config.latency_ms()
        );

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback
    pub fn play(&self) {
        self.sink.play();
    }

    /// Signal that no more samples will be produced
    ///
    /// The source ends once the ring buffer is drained.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    /// Block until the queued audio has played out
    pub fn wait_for_finish(&self) {
        self.sink.sleep_until_end();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.finish();
        self.sink.pause();
    }
}
