//! # Cantus - Time-driven Musical Sequencing
//!
//! Schedule musical actions at exact rational beat positions and drive them
//! from an internal or external clock.
//!
//! ## Architecture
//!
//! Cantus is an umbrella crate that coordinates:
//! - **cantus-series** - Lazy, possibly infinite series and their combinators
//! - **cantus-core** - Positions, clocks, the transport loop and the sequencer
//! - **cantus-midi** - Note sinks, voices, scales and MIDI clock input
//!
//! ## Quick Start
//!
//! ```ignore
//! use cantus::prelude::*;
//!
//! let sink = TracingSink::new(4, 24);
//! let mut engine = CantusEngine::builder()
//!     .bpm(100.0)
//!     .build(MidiVoices::new(sink, 1)?)?;
//!
//! let melody = record()
//!     .field("pitch", s![60, 62, 64, 65, 67])
//!     .field("duration", s![r(1, 4)].repeat_forever()?)
//!     .build()?;
//!
//! engine.sequencer_mut().at(1, move |seq: &mut Sequencer<MidiVoices>| {
//!     seq.play(melody, |seq, note: Record| { ... })?;
//!     Ok::<_, cantus::Error>(())
//! })?;
//! engine.start()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `midi-io` - MIDI clock input from hardware or virtual ports (`midir`)

/// Re-export of cantus-core for direct access
pub use cantus_core as core;

/// Re-export of cantus-series for direct access
pub use cantus_series as series;

/// Re-export of cantus-midi for direct access
pub use cantus_midi as midi;

// Core types
pub use cantus_core::{
    event_args, ActionOutcome, AdvanceReport, BoxError, CantusConfig, Clock, ClockEvent,
    ClockStatus, Control, ControlId, EventArgs, ExternalClock, ExternalClockFeed, HasDuration,
    IntoBeats, Position, Sequencer, Tempo, TimedEvent, TimedValue, TimerClock, Transport,
    TransportHandle, TransportState, BBT,
};

// Series
pub use cantus_series::{r, s, BoxSeries, Rational, Record, Series, Value};

// MIDI boundary
pub use cantus_midi::{
    MidiClockDecoder, MidiVoices, Note, NoteSink, PitchResolver, RecordingSink, Scale,
    TracingSink, Voice,
};

#[cfg(feature = "midi-io")]
pub use cantus_midi::MidiClockInput;

mod error;
pub use error::{Error, Result};

mod builder;
mod engine;

pub use builder::CantusEngineBuilder;
pub use engine::CantusEngine;

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{CantusEngine, CantusEngineBuilder};

    // Scheduling
    pub use crate::core::{
        event_args, CantusConfig, Control, EventArgs, Position, Sequencer, TimedEvent,
        TimedValue, TransportHandle,
    };

    // Series vocabulary
    pub use crate::series::{
        concat, count_from, fibo, for_range, merge, r, record, rnd, rnd_seeded, s, unfold,
        Buffered, Rational, Record, Series, Value,
    };

    // Output
    pub use crate::midi::{MidiVoices, PitchResolver, RecordingSink, Scale, TracingSink, Voice};
}
