//! Error types for the MIDI boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cantus_core::Error),

    #[error("Invalid note: {0}")]
    InvalidNote(String),

    #[error("MIDI channel {0} out of range (0-15)")]
    InvalidChannel(usize),

    #[error("Voice {0} does not exist")]
    UnknownVoice(usize),

    #[error("Invalid scale: {0}")]
    InvalidScale(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
