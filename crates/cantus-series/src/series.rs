//! The `Series` trait and its combinator methods.

use crate::buffered::Buffered;
use crate::combine::{Repeat, Zip};
use crate::error::{Result, SeriesError};
use crate::transform::{Map, MaxSize, Reverse, Select};

/// A lazy, possibly infinite, one-directional sequence of values.
///
/// `next_value` returns `None` once the series is exhausted, and keeps
/// returning `None` on every later call.
///
/// `restart` rewinds the series to its first element when the variant
/// supports it. Combinators that need to replay a source (`repeat`) check
/// `can_restart` when they are built.
pub trait Series: Send {
    type Item;

    fn next_value(&mut self) -> Option<Self::Item>;

    /// Rewind to the first element. Returns `false` if this series cannot be
    /// replayed, in which case its state is left untouched.
    fn restart(&mut self) -> bool;

    fn can_restart(&self) -> bool;

    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> U + Send,
    {
        Map::new(self, f)
    }

    /// Keep only the values matching `predicate`.
    fn select<F>(self, predicate: F) -> Select<Self, F>
    where
        Self: Sized,
        F: FnMut(&Self::Item) -> bool + Send,
    {
        Select::new(self, predicate)
    }

    /// Yield the source backwards. The source is drained on first read, so it
    /// must be finite.
    fn reverse(self) -> Reverse<Self>
    where
        Self: Sized,
        Self::Item: Send,
    {
        Reverse::new(self)
    }

    /// Play the source `times` times in a row.
    fn repeat(self, times: usize) -> Result<Repeat<Self>>
    where
        Self: Sized,
    {
        if !self.can_restart() {
            return Err(SeriesError::NotRestartable);
        }
        Ok(Repeat::new(self, Some(times)))
    }

    /// Play the source over and over.
    fn repeat_forever(self) -> Result<Repeat<Self>>
    where
        Self: Sized,
    {
        if !self.can_restart() {
            return Err(SeriesError::NotRestartable);
        }
        Ok(Repeat::new(self, None))
    }

    /// Cap the series at `max` elements.
    fn max_size(self, max: usize) -> MaxSize<Self>
    where
        Self: Sized,
    {
        MaxSize::new(self, max)
    }

    fn zip<B>(self, other: B) -> Zip<Self, B>
    where
        Self: Sized,
        B: Series,
    {
        Zip::new(self, other)
    }

    /// Wrap the series in a shared memo buffer. Open readers with
    /// [`Buffered::cursor`].
    fn buffered(self) -> Buffered<Self::Item>
    where
        Self: Sized + 'static,
        Self::Item: Clone + Send + 'static,
    {
        Buffered::new(self)
    }

    fn boxed<'a>(self) -> BoxSeries<'a, Self::Item>
    where
        Self: Sized + 'a,
    {
        Box::new(self)
    }

    /// Read the series through the `Iterator` interface.
    fn iter(self) -> SeriesIter<Self>
    where
        Self: Sized,
    {
        SeriesIter { series: self }
    }
}

/// Type-erased series.
pub type BoxSeries<'a, T> = Box<dyn Series<Item = T> + 'a>;

impl<S: Series + ?Sized> Series for Box<S> {
    type Item = S::Item;

    #[inline]
    fn next_value(&mut self) -> Option<Self::Item> {
        (**self).next_value()
    }

    fn restart(&mut self) -> bool {
        (**self).restart()
    }

    fn can_restart(&self) -> bool {
        (**self).can_restart()
    }
}

/// `Iterator` adapter returned by [`Series::iter`].
pub struct SeriesIter<S> {
    series: S,
}

impl<S: Series> SeriesIter<S> {
    pub fn into_inner(self) -> S {
        self.series
    }
}

impl<S: Series> Iterator for SeriesIter<S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.series.next_value()
    }
}
