//! Leaf series: literal values, numeric ranges, random picks and generators.

use crate::error::{Result, SeriesError};
use crate::series::Series;
use num_traits::Num;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed, finite list of values.
#[derive(Debug, Clone)]
pub struct Literal<T> {
    values: Vec<T>,
    index: usize,
}

/// Literal series over `values`.
pub fn s<T: Clone + Send>(values: Vec<T>) -> Literal<T> {
    Literal { values, index: 0 }
}

impl<T: Clone + Send> Series for Literal<T> {
    type Item = T;

    #[inline]
    fn next_value(&mut self) -> Option<T> {
        let value = self.values.get(self.index)?.clone();
        self.index += 1;
        Some(value)
    }

    fn restart(&mut self) -> bool {
        self.index = 0;
        true
    }

    fn can_restart(&self) -> bool {
        true
    }
}

/// One-shot series over an arbitrary iterator. Cannot be restarted.
pub struct FromIter<I> {
    iter: I,
    done: bool,
}

pub fn from_iter<I>(iter: I) -> FromIter<I::IntoIter>
where
    I: IntoIterator,
    I::IntoIter: Send,
{
    FromIter {
        iter: iter.into_iter(),
        done: false,
    }
}

impl<I: Iterator + Send> Series for FromIter<I> {
    type Item = I::Item;

    fn next_value(&mut self) -> Option<I::Item> {
        if self.done {
            return None;
        }
        let value = self.iter.next();
        self.done = value.is_none();
        value
    }

    fn restart(&mut self) -> bool {
        false
    }

    fn can_restart(&self) -> bool {
        false
    }
}

/// Arithmetic progression from `from` towards an optional bound.
#[derive(Debug, Clone)]
pub struct Range<T> {
    from: T,
    to: Option<T>,
    step: T,
    descending: bool,
    current: T,
    done: bool,
}

/// Inclusive range from `from` to `to`. Counts downwards when `to < from`;
/// `step` is a magnitude and must be positive.
pub fn for_range<T>(from: T, to: T, step: T) -> Result<Range<T>>
where
    T: Num + PartialOrd + Copy + Send + core::fmt::Debug,
{
    Range::new(from, Some(to), step)
}

/// Unbounded ascending range.
pub fn count_from<T>(from: T, step: T) -> Result<Range<T>>
where
    T: Num + PartialOrd + Copy + Send + core::fmt::Debug,
{
    Range::new(from, None, step)
}

impl<T> Range<T>
where
    T: Num + PartialOrd + Copy + Send + core::fmt::Debug,
{
    fn new(from: T, to: Option<T>, step: T) -> Result<Self> {
        if step <= T::zero() {
            return Err(SeriesError::InvalidStep(format!("{:?}", step)));
        }
        let descending = matches!(to, Some(to) if to < from);
        Ok(Self {
            from,
            to,
            step,
            descending,
            current: from,
            done: false,
        })
    }
}

impl<T> Series for Range<T>
where
    T: Num + PartialOrd + Copy + Send,
{
    type Item = T;

    fn next_value(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let value = self.current;
        match self.to {
            Some(to) => {
                // Measure the gap before stepping so unsigned and near-MAX
                // bounds never overflow.
                let remaining = if self.descending { value - to } else { to - value };
                if remaining < self.step {
                    self.done = true;
                } else if self.descending {
                    self.current = value - self.step;
                } else {
                    self.current = value + self.step;
                }
            }
            None => self.current = value + self.step,
        }
        Some(value)
    }

    fn restart(&mut self) -> bool {
        self.current = self.from;
        self.done = false;
        true
    }

    fn can_restart(&self) -> bool {
        true
    }
}

/// Infinite draw with replacement from a fixed pool.
#[derive(Debug, Clone)]
pub struct Random<T> {
    pool: Vec<T>,
    rng: StdRng,
}

/// Random pick from `pool`, seeded from the OS.
pub fn rnd<T: Clone + Send>(pool: Vec<T>) -> Result<Random<T>> {
    Random::new(pool, StdRng::from_entropy())
}

/// Random pick from `pool` with a reproducible sequence.
pub fn rnd_seeded<T: Clone + Send>(pool: Vec<T>, seed: u64) -> Result<Random<T>> {
    Random::new(pool, StdRng::seed_from_u64(seed))
}

impl<T: Clone + Send> Random<T> {
    fn new(pool: Vec<T>, rng: StdRng) -> Result<Self> {
        if pool.is_empty() {
            return Err(SeriesError::EmptyPool);
        }
        Ok(Self { pool, rng })
    }
}

impl<T: Clone + Send> Series for Random<T> {
    type Item = T;

    fn next_value(&mut self) -> Option<T> {
        let index = self.rng.gen_range(0..self.pool.len());
        Some(self.pool[index].clone())
    }

    // Restarting keeps drawing from the same generator: a replay is a new
    // sequence of picks from the same pool.
    fn restart(&mut self) -> bool {
        true
    }

    fn can_restart(&self) -> bool {
        true
    }
}

/// Self-referential generator: each value is computed from the state left
/// by the previous ones.
#[derive(Clone)]
pub struct Unfold<St, F> {
    initial: St,
    state: St,
    step: F,
    done: bool,
}

/// Generator starting at `state`; `step` returns the next value and updates
/// the state, or `None` to end the series.
pub fn unfold<St, T, F>(state: St, step: F) -> Unfold<St, F>
where
    St: Clone + Send,
    F: FnMut(&mut St) -> Option<T> + Send,
{
    Unfold {
        initial: state.clone(),
        state,
        step,
        done: false,
    }
}

impl<St, T, F> Series for Unfold<St, F>
where
    St: Clone + Send,
    F: FnMut(&mut St) -> Option<T> + Send,
{
    type Item = T;

    fn next_value(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let value = (self.step)(&mut self.state);
        self.done = value.is_none();
        value
    }

    fn restart(&mut self) -> bool {
        self.state = self.initial.clone();
        self.done = false;
        true
    }

    fn can_restart(&self) -> bool {
        true
    }
}

/// Fibonacci numbers 1, 1, 2, 3, 5, ... Ends instead of overflowing.
pub fn fibo() -> Unfold<(i64, i64), fn(&mut (i64, i64)) -> Option<i64>> {
    fn step(state: &mut (i64, i64)) -> Option<i64> {
        let (current, next) = *state;
        *state = (next, current.checked_add(next)?);
        Some(current)
    }
    unfold((1, 1), step as fn(&mut (i64, i64)) -> Option<i64>)
}
