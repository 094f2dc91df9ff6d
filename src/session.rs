//! Stimulus-driven run loop
//!
//! A [`Session`] plays the part of the console wrapper: it feeds the core
//! the configured divider and tone inputs, synthetic sync from a
//! [`SyncGenerator`] and key levels from a [`KeyScanner`] following a
//! [`PressSchedule`].

use crate::config::CoreConfig;
use crate::console::{CoreInputs, CoreOutputs, PongCore};
use crate::stimulus::{KeyScanner, PressSchedule, SyncGenerator};
use crate::Result;

/// Core plus its synthetic surroundings
#[derive(Debug, Clone)]
pub struct Session {
    core: PongCore,
    inputs: CoreInputs,
    sync: SyncGenerator,
    scanner: KeyScanner,
    schedule: PressSchedule,
}

impl Session {
    /// Build from a validated config and a press schedule
    pub fn new(config: &CoreConfig, schedule: PressSchedule) -> Result<Self> {
        Ok(Self {
            core: PongCore::from_config(config)?,
            inputs: CoreInputs::from_config(config),
            sync: SyncGenerator::new(config.video),
            scanner: KeyScanner::new(),
            schedule,
        })
    }

    /// Run one master tick
    ///
    /// Sync levels move on only when the detector was clocked, so every
    /// derived tick sees one sync position.
    pub fn step(&mut self) -> CoreOutputs {
        self.schedule.apply(self.core.ticks(), self.scanner.matrix_mut());

        let (hsync, vsync) = self.sync.levels();
        let (scan_index, pressed_low) = self.scanner.scan();
        let clocked = self.core.divider().period_pulse();

        let out = self.core.tick(&CoreInputs {
            hsync,
            vsync,
            scan_index,
            pressed_low,
            ..self.inputs
        });
        if clocked {
            self.sync.advance();
        }
        out
    }

    /// Run `ticks` master ticks, handing each tick's outputs to `sink`
    pub fn run<F>(&mut self, ticks: u64, mut sink: F) -> Result<()>
    where
        F: FnMut(u64, &CoreOutputs) -> Result<()>,
    {
        for _ in 0..ticks {
            let tick = self.core.ticks();
            let out = self.step();
            sink(tick, &out)?;
        }
        Ok(())
    }

    /// Master ticks run so far
    pub fn ticks(&self) -> u64 {
        self.core.ticks()
    }

    /// The core being driven
    pub fn core(&self) -> &PongCore {
        &self.core
    }

    /// Sync source state
    pub fn sync(&self) -> &SyncGenerator {
        &self.sync
    }
}
