//! Builder for configuring and constructing a `CantusEngine`.

use crate::core::{CantusConfig, Clock, ExternalClock, ExternalClockFeed, TimerClock};
use crate::{CantusEngine, Result};
use std::time::Duration;

#[cfg(feature = "midi-io")]
use crate::midi::{MidiClockInput, MIDI_CLOCK_TICKS_PER_BEAT};

enum ClockChoice {
    Timer,
    External(String),
    #[cfg(feature = "midi-io")]
    MidiInput(String),
    Custom(Box<dyn Clock>),
}

/// The timer clock is used unless another clock is selected.
///
/// # Example
///
/// ```ignore
/// use cantus::prelude::*;
///
/// let mut engine = CantusEngine::builder()
///     .bpm(96.0)
///     .beats_per_bar(3)
///     .build(voices)?;
///
/// engine.sequencer_mut().at(1, |seq| { ... })?;
/// engine.start()?;
/// ```
pub struct CantusEngineBuilder {
    config: CantusConfig,
    clock: ClockChoice,
}

impl Default for CantusEngineBuilder {
    fn default() -> Self {
        Self {
            config: CantusConfig::default(),
            clock: ClockChoice::Timer,
        }
    }
}

impl CantusEngineBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: CantusConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 120
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.config.bpm = bpm;
        self
    }

    /// Default: 4
    pub fn beats_per_bar(mut self, beats: u32) -> Self {
        self.config.beats_per_bar = beats;
        self
    }

    /// Default: 24
    pub fn ticks_per_beat(mut self, ticks: u32) -> Self {
        self.config.ticks_per_beat = ticks;
        self
    }

    /// Default: 2 s
    pub fn stall_timeout(mut self, timeout: Duration) -> Self {
        self.config.stall_timeout = timeout;
        self
    }

    /// Log every executed action at debug level.
    pub fn log_events(mut self, enabled: bool) -> Self {
        self.config.log_events = enabled;
        self
    }

    /// Internal clock at the configured tempo.
    pub fn timer_clock(mut self) -> Self {
        self.clock = ClockChoice::Timer;
        self
    }

    /// Clock fed through the engine's [`ExternalClockFeed`].
    pub fn external_clock(mut self, name: impl Into<String>) -> Self {
        self.clock = ClockChoice::External(name.into());
        self
    }

    /// Follow MIDI clock from the first input port whose name contains
    /// `port`. Forces 24 ticks per beat.
    #[cfg(feature = "midi-io")]
    pub fn midi_clock(mut self, port: impl Into<String>) -> Self {
        self.clock = ClockChoice::MidiInput(port.into());
        self
    }

    pub fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = ClockChoice::Custom(clock);
        self
    }

    /// Build the engine around the composition context `context`.
    pub fn build<C: 'static>(mut self, context: C) -> Result<CantusEngine<C>> {
        self.config.validate()?;

        let mut feed: Option<ExternalClockFeed> = None;
        #[cfg(feature = "midi-io")]
        let mut midi_input = None;

        let clock: Box<dyn Clock> = match self.clock {
            ClockChoice::Timer => Box::new(TimerClock::new(
                self.config.tempo()?,
                self.config.ticks_per_beat,
            )),
            ClockChoice::External(name) => {
                let (clock, clock_feed) = ExternalClock::new(name);
                feed = Some(clock_feed);
                Box::new(clock)
            }
            #[cfg(feature = "midi-io")]
            ClockChoice::MidiInput(port) => {
                self.config.ticks_per_beat = MIDI_CLOCK_TICKS_PER_BEAT;
                let (clock, clock_feed) = ExternalClock::new(format!("midi:{}", port));
                midi_input = Some(MidiClockInput::connect(&port, clock_feed.clone())?);
                feed = Some(clock_feed);
                Box::new(clock)
            }
            ClockChoice::Custom(clock) => clock,
        };

        tracing::debug!(
            "Building engine: {} BPM, {}/{} ticks, clock '{}'",
            self.config.bpm,
            self.config.beats_per_bar,
            self.config.ticks_per_beat,
            clock.name()
        );
        let transport = crate::core::Transport::new(clock, context, self.config)?;

        let engine = CantusEngine::from_parts(transport, feed);
        #[cfg(feature = "midi-io")]
        let engine = engine.with_midi_input(midi_input);
        Ok(engine)
    }
}
