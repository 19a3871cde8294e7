//! Output sinks receiving note edges.

use cantus_core::{Position, Rational};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Pitches sounding together. Most notes are single pitches or small chords.
pub type Pitches = SmallVec<[u8; 4]>;

/// A note (or chord) as sent to a [`NoteSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Zero-based MIDI channel.
    pub channel: u8,
    pub pitches: Pitches,
    pub velocity: u8,
    /// Length in beats.
    pub duration: Rational,
}

/// Receives note edges from voices.
///
/// Implementations must be cheap: they are called from the transport loop.
pub trait NoteSink: Send {
    /// A note starts at `at`.
    fn note(&mut self, note: &Note, at: Position);

    /// The matching end of a note previously passed to [`note`](Self::note).
    fn note_off(&mut self, note: &Note, at: Position) {
        let _ = (note, at);
    }

    /// Silence everything on `channel`.
    fn all_notes_off(&mut self, channel: u8);
}

/// One edge captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteEdge {
    On {
        channel: u8,
        pitch: u8,
        velocity: u8,
        at: Position,
    },
    Off {
        channel: u8,
        pitch: u8,
        at: Position,
    },
    AllOff {
        channel: u8,
    },
}

/// Sink that keeps every edge in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    edges: Arc<Mutex<Vec<NoteEdge>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edges(&self) -> Vec<NoteEdge> {
        self.edges.lock().clone()
    }

    /// Note-on edges as `(pitch, position)` pairs.
    pub fn onsets(&self) -> Vec<(u8, Position)> {
        self.edges
            .lock()
            .iter()
            .filter_map(|edge| match edge {
                NoteEdge::On { pitch, at, .. } => Some((*pitch, *at)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.edges.lock().clear();
    }
}

impl NoteSink for RecordingSink {
    fn note(&mut self, note: &Note, at: Position) {
        let mut edges = self.edges.lock();
        edges.extend(note.pitches.iter().map(|&pitch| NoteEdge::On {
            channel: note.channel,
            pitch,
            velocity: note.velocity,
            at,
        }));
    }

    fn note_off(&mut self, note: &Note, at: Position) {
        let mut edges = self.edges.lock();
        edges.extend(note.pitches.iter().map(|&pitch| NoteEdge::Off {
            channel: note.channel,
            pitch,
            at,
        }));
    }

    fn all_notes_off(&mut self, channel: u8) {
        self.edges.lock().push(NoteEdge::AllOff { channel });
    }
}

/// Sink that logs note edges through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    beats_per_bar: u32,
    ticks_per_beat: u32,
}

impl TracingSink {
    /// Log positions as bar.beat.tick with the given meter.
    pub fn new(beats_per_bar: u32, ticks_per_beat: u32) -> Self {
        Self {
            beats_per_bar,
            ticks_per_beat,
        }
    }

    fn describe(&self, at: Position) -> String {
        if self.beats_per_bar == 0 || self.ticks_per_beat == 0 {
            at.to_string()
        } else {
            at.to_bbt(self.beats_per_bar, self.ticks_per_beat).to_string()
        }
    }
}

impl NoteSink for TracingSink {
    fn note(&mut self, note: &Note, at: Position) {
        tracing::info!(
            "{} ch{} note {:?} vel {} dur {}",
            self.describe(at),
            note.channel + 1,
            note.pitches.as_slice(),
            note.velocity,
            note.duration
        );
    }

    fn note_off(&mut self, note: &Note, at: Position) {
        tracing::debug!(
            "{} ch{} off {:?}",
            self.describe(at),
            note.channel + 1,
            note.pitches.as_slice()
        );
    }

    fn all_notes_off(&mut self, channel: u8) {
        tracing::info!("ch{} all notes off", channel + 1);
    }
}
