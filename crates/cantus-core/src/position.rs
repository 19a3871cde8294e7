//! Musical position in exact rational beats, and its bar/beat/tick view.

use cantus_series::Rational;
use core::fmt;
use core::ops::{Add, AddAssign, Sub};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// Beats elapsed since transport start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(Rational);

impl Position {
    #[inline]
    pub fn zero() -> Self {
        Self(Rational::zero())
    }

    #[inline]
    pub fn from_beats(beats: Rational) -> Self {
        Self(beats)
    }

    /// Position reached after `ticks` ticks of `ticks_per_beat` each.
    #[inline]
    pub fn from_ticks(ticks: u64, ticks_per_beat: u32) -> Self {
        Self(Rational::new(ticks as i64, ticks_per_beat.max(1) as i64))
    }

    #[inline]
    pub fn beats(&self) -> Rational {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Rational::zero()
    }

    pub fn to_bbt(&self, beats_per_bar: u32, ticks_per_beat: u32) -> BBT {
        let beats_per_bar = beats_per_bar.max(1) as i64;
        let whole = self.0.floor();
        let fraction = self.0 - whole;
        let whole = whole.to_integer();
        BBT {
            bar: whole.div_euclid(beats_per_bar) + 1,
            beat: (whole.rem_euclid(beats_per_bar) + 1) as u32,
            tick: (fraction * Rational::from_integer(ticks_per_beat as i64))
                .floor()
                .to_integer() as u32,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<Rational> for Position {
    type Output = Self;

    #[inline]
    fn add(self, beats: Rational) -> Self {
        Self(self.0 + beats)
    }
}

impl AddAssign<Rational> for Position {
    #[inline]
    fn add_assign(&mut self, beats: Rational) {
        self.0 += beats;
    }
}

impl Sub<Position> for Position {
    type Output = Rational;

    #[inline]
    fn sub(self, other: Position) -> Rational {
        self.0 - other.0
    }
}

/// Anything that can be read as a number of beats: integers, rationals and
/// positions.
pub trait IntoBeats {
    fn into_beats(self) -> Rational;
}

impl IntoBeats for Rational {
    fn into_beats(self) -> Rational {
        self
    }
}

impl IntoBeats for Position {
    fn into_beats(self) -> Rational {
        self.0
    }
}

impl IntoBeats for i32 {
    fn into_beats(self) -> Rational {
        Rational::from_integer(self as i64)
    }
}

impl IntoBeats for i64 {
    fn into_beats(self) -> Rational {
        Rational::from_integer(self)
    }
}

impl IntoBeats for u32 {
    fn into_beats(self) -> Rational {
        Rational::from_integer(self as i64)
    }
}

/// Bar, beat and tick as a DAW would display them: bar and beat count from
/// one, tick from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BBT {
    pub bar: i64,
    pub beat: u32,
    pub tick: u32,
}

impl BBT {
    pub fn new(bar: i64, beat: u32, tick: u32) -> Self {
        Self { bar, beat, tick }
    }

    pub fn to_position(&self, beats_per_bar: u32, ticks_per_beat: u32) -> Position {
        let whole = (self.bar - 1) * beats_per_bar as i64 + self.beat as i64 - 1;
        Position(
            Rational::from_integer(whole)
                + Rational::new(self.tick as i64, ticks_per_beat.max(1) as i64),
        )
    }
}

impl fmt::Display for BBT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.bar, self.beat, self.tick)
    }
}
