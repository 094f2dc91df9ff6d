//! Per-tick CSV traces
//!
//! A trace is one CSV row per master tick holding every registered output.
//! Two runs with the same inputs must produce identical traces, so traces
//! double as golden files: [`first_divergence`] reports the first tick at
//! which two recordings disagree.

use crate::console::CoreOutputs;
use crate::{CoreError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

/// One traced tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRow {
    /// Master tick index
    pub tick: u64,
    /// Derived tick level
    pub derived: u8,
    /// Horizontal blanking
    pub h_blank: u8,
    /// Vertical blanking
    pub v_blank: u8,
    /// Left sample
    pub left: i16,
    /// Right sample
    pub right: i16,
    /// Manual serve mode
    pub manual_serve: u8,
    /// Serve line
    pub serve: u8,
    /// Small paddles
    pub paddle_small: u8,
    /// Fast ball
    pub ball_fast: u8,
    /// Steep angles
    pub angle_steep: u8,
    /// Game select lines (6 bits, active low)
    pub game_select: u8,
}

impl TraceRow {
    /// Flatten one tick's outputs
    pub fn new(tick: u64, out: &CoreOutputs) -> Self {
        let c = &out.controls;
        Self {
            tick,
            derived: u8::from(out.derived_tick),
            h_blank: u8::from(out.h_blank),
            v_blank: u8::from(out.v_blank),
            left: out.sample.left,
            right: out.sample.right,
            manual_serve: u8::from(c.manual_serve),
            serve: u8::from(c.serve),
            paddle_small: u8::from(c.paddle_small),
            ball_fast: u8::from(c.ball_fast),
            angle_steep: u8::from(c.angle_steep),
            game_select: c.game_select.bits(),
        }
    }

    /// Rows are equal ignoring the tick index
    fn same_signals(&self, other: &TraceRow) -> bool {
        TraceRow { tick: 0, ..*self } == TraceRow { tick: 0, ..*other }
    }
}

/// CSV writer for per-tick outputs
pub struct TraceRecorder<W: io::Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl TraceRecorder<File> {
    /// Create a trace file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let writer = csv::Writer::from_path(path.as_ref())
            .map_err(|e| CoreError::TraceError(format!("{}: {e}", path.as_ref().display())))?;
        Ok(Self { writer, rows: 0 })
    }
}

impl<W: io::Write> TraceRecorder<W> {
    /// Record into any writer
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            rows: 0,
        }
    }

    /// Append one tick
    pub fn record(&mut self, tick: u64, out: &CoreOutputs) -> Result<()> {
        self.writer
            .serialize(TraceRow::new(tick, out))
            .map_err(|e| CoreError::TraceError(e.to_string()))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and return the underlying writer
    pub fn finish(self) -> Result<W> {
        let rows = self.rows;
        let inner = self
            .writer
            .into_inner()
            .map_err(|e| CoreError::TraceError(e.to_string()))?;
        info!("trace complete: {rows} ticks");
        Ok(inner)
    }
}

/// Read a trace back
pub fn read_trace<R: io::Read>(reader: R) -> Result<Vec<TraceRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<TraceRow>, _>>()
        .map_err(|e| CoreError::TraceError(e.to_string()))?;
    Ok(rows)
}

/// Tick of the first row where two traces differ
///
/// A trace that ends early diverges at the first missing tick.
pub fn first_divergence(a: &[TraceRow], b: &[TraceRow]) -> Option<u64> {
    a.iter()
        .zip(b)
        .find(|(x, y)| !x.same_signals(y))
        .map(|(x, _)| x.tick)
        .or_else(|| match a.len().cmp(&b.len()) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => b.get(a.len()).map(|r| r.tick),
            std::cmp::Ordering::Greater => a.get(b.len()).map(|r| r.tick),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{CoreInputs, PongCore};

    fn record(ticks: u64, inputs: &CoreInputs) -> Vec<u8> {
        let mut core = PongCore::new();
        let mut rec = TraceRecorder::from_writer(Vec::new());
        for t in 0..ticks {
            let out = core.tick(inputs);
            rec.record(t, &out).unwrap();
        }
        rec.finish().unwrap()
    }

    fn tone() -> CoreInputs {
        CoreInputs {
            divisor: 8,
            freq: 3_000,
            vol_left: 0x1000,
            vol_right: 0x0400,
            ..CoreInputs::default()
        }
    }

    #[test]
    fn test_header_and_first_row() {
        let bytes = record(1, &CoreInputs::default());
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("tick,derived,h_blank,v_blank,left,right,manual_serve,serve,paddle_small,ball_fast,angle_steep,game_select")
        );
        assert_eq!(lines.next(), Some("0,0,0,0,0,0,1,0,0,0,0,62"));
    }

    #[test]
    fn test_same_inputs_same_trace() {
        let a = read_trace(record(2_000, &tone()).as_slice()).unwrap();
        let b = read_trace(record(2_000, &tone()).as_slice()).unwrap();
        assert_eq!(a.len(), 2_000);
        assert_eq!(first_divergence(&a, &b), None);
    }

    #[test]
    fn test_divergence_reported() {
        let a = read_trace(record(100, &tone()).as_slice()).unwrap();
        let louder = CoreInputs {
            vol_right: 0x0800,
            ..tone()
        };
        let b = read_trace(record(100, &louder).as_slice()).unwrap();
        // Volume enters the pipeline on tick 0 and shows on tick 2
        assert_eq!(first_divergence(&a, &b), Some(2));
        assert_eq!(first_divergence(&a, &a[..50]), Some(50));
    }

    #[test]
    fn test_create_trace_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        let mut rec = TraceRecorder::create(&path).unwrap();
        rec.record(0, &CoreOutputs::default()).unwrap();
        assert_eq!(rec.rows(), 1);
        rec.finish().unwrap();
        let rows = read_trace(File::open(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
