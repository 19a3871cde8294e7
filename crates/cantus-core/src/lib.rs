//! Sequencing kernel: exact rational positions, clocks, the transport loop
//! and the action scheduler.
//!
//! # Primary API
//!
//! - [`Sequencer`]: schedule actions with `at`, `wait`, `every`, `play` and
//!   `play_timed`, register and launch named events
//! - [`Control`]: chain continuations onto scheduled work or cancel it
//! - [`Transport`] / [`TransportHandle`]: run the sequencer from a [`Clock`]
//! - [`TimerClock`] / [`ExternalClock`]: internal and externally fed clocks
//!
//! # Example
//!
//! ```ignore
//! use cantus_core::*;
//!
//! let clock = TimerClock::new(Tempo::new(96.0)?, 24);
//! let mut transport = Transport::new(Box::new(clock), (), CantusConfig::default())?;
//! transport.sequencer_mut().at(4, |seq: &mut Sequencer| seq.stop_transport())?;
//! transport.start()?;
//! ```

#[macro_use]
mod macros;

pub mod config;
pub use config::{CantusConfig, Tempo};

pub mod error;
pub use error::{BoxError, Error, Result};

pub(crate) mod lockfree;
pub use lockfree::AtomicFlag;

mod position;
pub use position::{IntoBeats, Position, BBT};

mod sequencer;
pub use sequencer::{
    ActionOutcome, AdvanceReport, Control, ControlId, EventArgs, HasDuration, Sequencer,
    TimedEvent, TimedValue,
};

mod transport;
pub use transport::{
    Clock, ClockEvent, ClockSink, ClockStatus, ClockSync, ExternalClock, ExternalClockFeed,
    HookPhase, TimerClock, Transport, TransportHandle, TransportMessage, TransportState,
};

pub use cantus_series::{r, Rational};
