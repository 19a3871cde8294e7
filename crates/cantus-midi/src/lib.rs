//! MIDI boundary for cantus: note sinks, voices, scales and MIDI clock input.
//!
//! Channel messages are never encoded to the wire here. A [`NoteSink`]
//! receives note edges at their positions; [`RecordingSink`] keeps them for
//! inspection and [`TracingSink`] logs them.
//!
//! Feature gates: `midi-io` (MIDI clock input from a hardware or virtual port
//! via `midir`).

pub mod error;
pub use error::{Error, Result};

mod sink;
pub use sink::{Note, NoteEdge, NoteSink, Pitches, RecordingSink, TracingSink};

mod voices;
pub use voices::{MidiVoices, Voice, MIDI_CHANNELS};

mod scale;
pub use scale::{PitchResolver, Scale};

mod clock_input;
pub use clock_input::{MidiClockDecoder, MIDI_CLOCK_TICKS_PER_BEAT};

#[cfg(feature = "midi-io")]
pub use clock_input::MidiClockInput;
