//! Engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tempo in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Tempo(f64);

impl Tempo {
    pub const MIN: f64 = 20.0;
    pub const MAX: f64 = 999.0;

    pub fn new(bpm: f64) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&bpm) {
            return Err(Error::InvalidTempo(bpm));
        }
        Ok(Self(bpm))
    }

    #[inline]
    pub fn bpm(&self) -> f64 {
        self.0
    }

    /// Wall-clock length of one tick at this tempo.
    pub fn tick_period(&self, ticks_per_beat: u32) -> Duration {
        Duration::from_secs_f64(60.0 / (self.0 * ticks_per_beat.max(1) as f64))
    }
}

/// Configuration for the sequencing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CantusConfig {
    pub beats_per_bar: u32,
    pub ticks_per_beat: u32,
    pub bpm: f64,
    /// How long the transport waits for a clock message before reporting a
    /// stall.
    pub stall_timeout: Duration,
    /// Log every executed action at debug level.
    pub log_events: bool,
}

impl Default for CantusConfig {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            ticks_per_beat: 24,
            bpm: 120.0,
            stall_timeout: Duration::from_secs(2),
            log_events: false,
        }
    }
}

impl CantusConfig {
    pub fn validate(&self) -> Result<()> {
        if self.beats_per_bar == 0 || self.beats_per_bar > 64 {
            return Err(Error::InvalidConfig(format!(
                "beats_per_bar {} out of range (1-64)",
                self.beats_per_bar
            )));
        }
        if self.ticks_per_beat == 0 || self.ticks_per_beat > 960 {
            return Err(Error::InvalidConfig(format!(
                "ticks_per_beat {} out of range (1-960)",
                self.ticks_per_beat
            )));
        }
        if self.stall_timeout.is_zero() {
            return Err(Error::InvalidConfig("stall_timeout must be non-zero".into()));
        }
        Tempo::new(self.bpm)?;
        Ok(())
    }

    pub fn tempo(&self) -> Result<Tempo> {
        Tempo::new(self.bpm)
    }
}
