//! Voices: one MIDI channel each, writing to a shared sink.

use crate::sink::{Note, NoteSink, Pitches};
use crate::{Error, Result};
use cantus_core::{Control, IntoBeats, Rational, Sequencer};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type SharedSink = Arc<Mutex<Box<dyn NoteSink>>>;

/// Number of MIDI channels.
pub const MIDI_CHANNELS: usize = 16;

/// A single monophonic-or-chordal line bound to one channel.
///
/// Cheap to clone, so an action can take a voice out of the composition
/// context and still hand the sequencer to [`note`](Self::note).
#[derive(Clone)]
pub struct Voice {
    channel: u8,
    sink: SharedSink,
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice").field("channel", &self.channel).finish()
    }
}

impl Voice {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Sound `pitches` now and release them `duration` beats later.
    ///
    /// The note-on reaches the sink immediately; the note-off is scheduled
    /// on `seq`. An empty pitch list is a rest and returns `None`.
    ///
    /// # Example
    /// ```ignore
    /// let voice = seq.context().voice(0)?;
    /// voice.note(seq, [60, 64, 67], 100, r(1, 2))?;
    /// ```
    pub fn note<C, P, D>(
        &self,
        seq: &mut Sequencer<C>,
        pitches: P,
        velocity: u8,
        duration: D,
    ) -> Result<Option<Control<C>>>
    where
        C: 'static,
        P: IntoIterator<Item = u8>,
        D: IntoBeats,
    {
        let duration = duration.into_beats();
        if duration <= Rational::from_integer(0) {
            return Err(Error::Core(cantus_core::Error::InvalidDuration(format!(
                "note duration {} must be positive",
                duration
            ))));
        }
        if velocity > 127 {
            return Err(Error::InvalidNote(format!("velocity {} above 127", velocity)));
        }
        let pitches: Pitches = pitches.into_iter().collect();
        if let Some(pitch) = pitches.iter().find(|&&pitch| pitch > 127) {
            return Err(Error::InvalidNote(format!("pitch {} above 127", pitch)));
        }
        if pitches.is_empty() {
            return Ok(None);
        }

        let note = Note {
            channel: self.channel,
            pitches,
            velocity,
            duration,
        };
        self.sink.lock().note(&note, seq.position());

        let sink = Arc::clone(&self.sink);
        let release = seq.wait(duration, move |seq: &mut Sequencer<C>| {
            sink.lock().note_off(&note, seq.position());
        })?;
        Ok(Some(release))
    }

    /// Silence this voice's channel.
    pub fn all_notes_off(&self) {
        self.sink.lock().all_notes_off(self.channel);
    }
}

/// A set of voices on consecutive channels sharing one sink.
#[derive(Clone)]
pub struct MidiVoices {
    voices: Vec<Voice>,
    sink: SharedSink,
}

impl fmt::Debug for MidiVoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidiVoices")
            .field("voices", &self.voices.len())
            .finish()
    }
}

impl MidiVoices {
    /// `count` voices on channels `0..count`.
    pub fn new(sink: impl NoteSink + 'static, count: usize) -> Result<Self> {
        if count == 0 || count > MIDI_CHANNELS {
            return Err(Error::InvalidChannel(count.saturating_sub(1)));
        }
        let sink: SharedSink = Arc::new(Mutex::new(Box::new(sink)));
        let voices = (0..count as u8)
            .map(|channel| Voice {
                channel,
                sink: Arc::clone(&sink),
            })
            .collect();
        tracing::debug!("Created {} MIDI voices", count);
        Ok(Self { voices, sink })
    }

    pub fn voice(&self, index: usize) -> Result<Voice> {
        self.voices
            .get(index)
            .cloned()
            .ok_or(Error::UnknownVoice(index))
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// All notes off on every channel.
    pub fn panic(&self) {
        let mut sink = self.sink.lock();
        for voice in &self.voices {
            sink.all_notes_off(voice.channel);
        }
        tracing::info!("All notes off on {} channels", self.voices.len());
    }
}
