//! Centralized error type for the cantus umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cantus_core::Error),

    #[error("Series: {0}")]
    Series(#[from] cantus_series::SeriesError),

    #[error("MIDI: {0}")]
    Midi(#[from] cantus_midi::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
