//! MIDI clock input: real-time bytes to transport clock events.

use cantus_core::{ClockEvent, ExternalClockFeed};

/// MIDI clock runs at 24 pulses per quarter note.
pub const MIDI_CLOCK_TICKS_PER_BEAT: u32 = 24;

const TIMING_CLOCK: u8 = 0xF8;
const START: u8 = 0xFA;
const CONTINUE: u8 = 0xFB;
const STOP: u8 = 0xFC;
const SONG_POSITION: u8 = 0xF2;

/// Decodes MIDI system real-time and song position messages.
///
/// Clock masters usually send timing pulses even while stopped; pulses are
/// only forwarded between a start (or continue) and a stop.
#[derive(Debug, Clone, Default)]
pub struct MidiClockDecoder {
    playing: bool,
}

impl MidiClockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Decode one MIDI message. Returns `None` for anything that is not a
    /// clock message and for pulses received while stopped.
    pub fn decode(&mut self, message: &[u8]) -> Option<ClockEvent> {
        match *message.first()? {
            TIMING_CLOCK => self.playing.then_some(ClockEvent::Tick),
            START => {
                self.playing = true;
                Some(ClockEvent::Start)
            }
            CONTINUE => {
                self.playing = true;
                Some(ClockEvent::Continue)
            }
            STOP => {
                self.playing = false;
                Some(ClockEvent::Stop)
            }
            SONG_POSITION => {
                let lsb = *message.get(1)? & 0x7F;
                let msb = *message.get(2)? & 0x7F;
                Some(ClockEvent::SongPosition(
                    u32::from(lsb) | (u32::from(msb) << 7),
                ))
            }
            _ => None,
        }
    }

    /// Decode `message` and forward the result to `feed`. Returns `true` if
    /// an event was delivered.
    pub fn forward(&mut self, message: &[u8], feed: &ExternalClockFeed) -> bool {
        match self.decode(message) {
            Some(event) => feed.send(event),
            None => false,
        }
    }
}

#[cfg(feature = "midi-io")]
mod io {
    use super::MidiClockDecoder;
    use crate::{Error, Result};
    use cantus_core::ExternalClockFeed;
    use midir::{Ignore, MidiInput, MidiInputConnection};

    const CLIENT_NAME: &str = "cantus-clock-input";

    /// Connection from a hardware or virtual MIDI input to an
    /// [`ExternalClockFeed`].
    ///
    /// # Example
    /// ```ignore
    /// let (clock, feed) = ExternalClock::new("midi");
    /// let _input = MidiClockInput::connect("IAC", feed)?;
    /// ```
    pub struct MidiClockInput {
        connection: Option<MidiInputConnection<()>>,
        port_name: String,
    }

    impl MidiClockInput {
        /// Names of the available input ports.
        pub fn ports() -> Result<Vec<String>> {
            let input = MidiInput::new(CLIENT_NAME)?;
            Ok(input
                .ports()
                .iter()
                .filter_map(|port| input.port_name(port).ok())
                .collect())
        }

        /// Connect to the first input port whose name contains `port`.
        pub fn connect(port: &str, feed: ExternalClockFeed) -> Result<Self> {
            let mut input = MidiInput::new(CLIENT_NAME)?;
            input.ignore(Ignore::SysexAndActiveSense);

            let ports = input.ports();
            let (found, port_name) = ports
                .iter()
                .find_map(|candidate| {
                    let name = input.port_name(candidate).ok()?;
                    name.contains(port).then_some((candidate.clone(), name))
                })
                .ok_or_else(|| Error::MidiPort(format!("no input port matching '{}'", port)))?;

            let mut decoder = MidiClockDecoder::new();
            let connection = input.connect(
                &found,
                "cantus-clock",
                move |_stamp, message, _| {
                    decoder.forward(message, &feed);
                },
                (),
            )?;

            tracing::info!("MIDI clock input connected to '{}'", port_name);
            Ok(Self {
                connection: Some(connection),
                port_name,
            })
        }

        pub fn port_name(&self) -> &str {
            &self.port_name
        }

        pub fn close(mut self) {
            self.disconnect();
        }

        fn disconnect(&mut self) {
            if let Some(connection) = self.connection.take() {
                let _ = connection.close();
                tracing::debug!("MIDI clock input '{}' closed", self.port_name);
            }
        }
    }

    impl Drop for MidiClockInput {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

#[cfg(feature = "midi-io")]
pub use io::MidiClockInput;
