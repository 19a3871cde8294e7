//! Multi-source combinators: repeat, zip, merge and concat.

use crate::series::Series;

/// Series returned by [`Series::repeat`] and [`Series::repeat_forever`].
pub struct Repeat<S> {
    source: S,
    times: Option<usize>,
    remaining: Option<usize>,
    yielded_this_pass: bool,
    done: bool,
}

impl<S> Repeat<S> {
    pub(crate) fn new(source: S, times: Option<usize>) -> Self {
        Self {
            source,
            times,
            remaining: times,
            yielded_this_pass: false,
            done: false,
        }
    }
}

impl<S: Series> Series for Repeat<S> {
    type Item = S::Item;

    fn next_value(&mut self) -> Option<S::Item> {
        while !self.done {
            if self.remaining == Some(0) {
                self.done = true;
                break;
            }
            if let Some(value) = self.source.next_value() {
                self.yielded_this_pass = true;
                return Some(value);
            }
            // A pass that produced nothing would spin forever.
            if !self.yielded_this_pass {
                self.done = true;
                break;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            if self.remaining != Some(0) && !self.source.restart() {
                self.done = true;
            }
            self.yielded_this_pass = false;
        }
        None
    }

    fn restart(&mut self) -> bool {
        if !self.source.restart() {
            return false;
        }
        self.remaining = self.times;
        self.yielded_this_pass = false;
        self.done = false;
        true
    }

    fn can_restart(&self) -> bool {
        self.source.can_restart()
    }
}

/// Series returned by [`Series::zip`]. Ends as soon as either side ends.
pub struct Zip<A, B> {
    a: A,
    b: B,
    done: bool,
}

impl<A, B> Zip<A, B> {
    pub(crate) fn new(a: A, b: B) -> Self {
        Self { a, b, done: false }
    }
}

impl<A: Series, B: Series> Series for Zip<A, B> {
    type Item = (A::Item, B::Item);

    fn next_value(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let pair = self
            .a
            .next_value()
            .and_then(|a| self.b.next_value().map(|b| (a, b)));
        self.done = pair.is_none();
        pair
    }

    fn restart(&mut self) -> bool {
        if !self.can_restart() {
            return false;
        }
        self.a.restart();
        self.b.restart();
        self.done = false;
        true
    }

    fn can_restart(&self) -> bool {
        self.a.can_restart() && self.b.can_restart()
    }
}

/// Round-robin interleave of several series.
pub struct Merge<S> {
    sources: Vec<S>,
    live: Vec<bool>,
    next: usize,
}

/// Interleave `sources` one value at a time, skipping exhausted ones, until
/// all of them are exhausted.
pub fn merge<S: Series>(sources: Vec<S>) -> Merge<S> {
    let live = vec![true; sources.len()];
    Merge {
        sources,
        live,
        next: 0,
    }
}

impl<S: Series> Series for Merge<S> {
    type Item = S::Item;

    fn next_value(&mut self) -> Option<S::Item> {
        let count = self.sources.len();
        for _ in 0..count {
            let index = self.next;
            self.next = (self.next + 1) % count;
            if !self.live[index] {
                continue;
            }
            match self.sources[index].next_value() {
                Some(value) => return Some(value),
                None => self.live[index] = false,
            }
        }
        None
    }

    fn restart(&mut self) -> bool {
        if !self.can_restart() {
            return false;
        }
        for source in &mut self.sources {
            source.restart();
        }
        self.live.fill(true);
        self.next = 0;
        true
    }

    fn can_restart(&self) -> bool {
        self.sources.iter().all(Series::can_restart)
    }
}

/// Sequential concatenation of several series.
pub struct Concat<S> {
    sources: Vec<S>,
    current: usize,
}

/// Play every value of each source in turn.
pub fn concat<S: Series>(sources: Vec<S>) -> Concat<S> {
    Concat {
        sources,
        current: 0,
    }
}

impl<S: Series> Series for Concat<S> {
    type Item = S::Item;

    fn next_value(&mut self) -> Option<S::Item> {
        while let Some(source) = self.sources.get_mut(self.current) {
            if let Some(value) = source.next_value() {
                return Some(value);
            }
            self.current += 1;
        }
        None
    }

    fn restart(&mut self) -> bool {
        if !self.can_restart() {
            return false;
        }
        for source in &mut self.sources {
            source.restart();
        }
        self.current = 0;
        true
    }

    fn can_restart(&self) -> bool {
        self.sources.iter().all(Series::can_restart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{for_range, from_iter, r, s, BoxSeries, Rational};

    #[test]
    fn test_repeat_zip_with_repeating_duration() {
        let quarter = r(1, 4);
        let pairs: Vec<(i32, Rational)> = s(vec![0, 2, 4])
            .repeat(2)
            .unwrap()
            .zip(s(vec![quarter]).repeat_forever().unwrap())
            .iter()
            .collect();
        assert_eq!(
            pairs,
            vec![
                (0, quarter),
                (2, quarter),
                (4, quarter),
                (0, quarter),
                (2, quarter),
                (4, quarter),
            ]
        );
    }

    #[test]
    fn test_repeat_zero_times_is_empty() {
        let mut repeated = s(vec![1, 2]).repeat(0).unwrap();
        assert_eq!(repeated.next_value(), None);
    }

    #[test]
    fn test_repeat_forever_of_empty_source_ends() {
        let mut repeated = s(Vec::<i32>::new()).repeat_forever().unwrap();
        assert_eq!(repeated.next_value(), None);
        assert_eq!(repeated.next_value(), None);
    }

    #[test]
    fn test_repeat_restart_replays_all_passes() {
        let mut repeated = s(vec![1]).repeat(3).unwrap();
        assert_eq!(repeated.next_value(), Some(1));
        assert!(repeated.restart());
        assert_eq!(repeated.iter().count(), 3);
    }

    #[test]
    fn test_zip_ends_with_shortest() {
        let pairs: Vec<(i32, char)> = s(vec![1, 2, 3]).zip(s(vec!['a', 'b'])).iter().collect();
        assert_eq!(pairs, vec![(1, 'a'), (2, 'b')]);
    }

    #[test]
    fn test_merge_round_robin_skips_exhausted() {
        let merged: Vec<i32> = merge(vec![s(vec![1, 2, 3]), s(vec![10]), s(vec![20, 21])])
            .iter()
            .collect();
        assert_eq!(merged, vec![1, 10, 20, 2, 21, 3]);
    }

    #[test]
    fn test_merge_of_boxed_heterogeneous_sources() {
        let sources: Vec<BoxSeries<'static, i32>> =
            vec![s(vec![0, 0]).boxed(), for_range(5, 6, 1).unwrap().boxed()];
        let merged: Vec<i32> = merge(sources).iter().collect();
        assert_eq!(merged, vec![0, 5, 0, 6]);
    }

    #[test]
    fn test_concat_is_sequential() {
        let joined: Vec<i32> = concat(vec![s(vec![1, 2]), s(vec![]), s(vec![3])]).iter().collect();
        assert_eq!(joined, vec![1, 2, 3]);
    }

    #[test]
    fn test_concat_with_one_shot_part_cannot_restart() {
        let sources: Vec<BoxSeries<'static, i32>> =
            vec![s(vec![1]).boxed(), from_iter(vec![2]).boxed()];
        let mut joined = concat(sources);
        assert!(!joined.can_restart());
        assert!(!joined.restart());
    }

    #[test]
    fn test_empty_merge_and_concat() {
        assert_eq!(merge(Vec::<crate::Literal<i32>>::new()).next_value(), None);
        assert_eq!(concat(Vec::<crate::Literal<i32>>::new()).next_value(), None);
    }
}
