//! Integration test modules for cantus
//!
//! - sequencer: scheduling through a running transport
//! - transport: lifecycle hooks, clocks and stop paths
//! - series: series playback into MIDI voices
//! - events: named events and their arguments

pub mod events;
pub mod sequencer;
pub mod series;
pub mod transport;
