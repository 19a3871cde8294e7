//! Lazy, possibly infinite musical series.
//!
//! A [`Series`] yields values one at a time and is read by a single consumer.
//! Series are built from leaf constructors ([`s`], [`for_range`], [`rnd`],
//! [`unfold`], [`fibo`], [`record`]) and combined with the provided methods
//! on the trait. [`Buffered`] turns any series into a shared store that
//! several [`Cursor`]s can read independently.
//!
//! ```ignore
//! use cantus_series::*;
//!
//! let melody = record()
//!     .field("grade", s![0, 2, 4, 5, 7].repeat(2)?)
//!     .field("duration", s![r(1, 4)].repeat_forever()?)
//!     .build()?;
//! ```

mod buffered;
mod combine;
mod error;
mod record;
mod series;
mod source;
mod transform;

pub use buffered::{Buffered, Cursor};
pub use combine::{concat, merge, Concat, Merge, Repeat, Zip};
pub use error::{Result, SeriesError};
pub use record::{record, Record, RecordBuilder, RecordSeries, Value};
pub use series::{BoxSeries, Series, SeriesIter};
pub use source::{
    count_from, fibo, for_range, from_iter, rnd, rnd_seeded, s, unfold, FromIter, Literal,
    Random, Range, Unfold,
};
pub use transform::{Map, MaxSize, Reverse, Select};

/// Exact rational number used for positions, durations and record fields.
pub type Rational = num_rational::Ratio<i64>;

/// Shorthand for `Rational::new(numer, denom)`.
///
/// # Panics
/// Panics if `denom` is zero.
#[inline]
pub fn r(numer: i64, denom: i64) -> Rational {
    Rational::new(numer, denom)
}

/// Literal series from a list of values.
///
/// # Example
/// ```ignore
/// let grades = s![0, 2, 4];
/// let names = s!["a", "b"];
/// ```
#[macro_export]
macro_rules! s {
    () => {
        $crate::s(::std::vec::Vec::new())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::s(::std::vec![$($value),+])
    };
}
