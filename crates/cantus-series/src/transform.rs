//! Lazy single-source transformations.

use crate::series::Series;

/// Series returned by [`Series::map`].
pub struct Map<S, F> {
    source: S,
    f: F,
}

impl<S, F> Map<S, F> {
    pub(crate) fn new(source: S, f: F) -> Self {
        Self { source, f }
    }
}

impl<S, F, U> Series for Map<S, F>
where
    S: Series,
    F: FnMut(S::Item) -> U + Send,
{
    type Item = U;

    #[inline]
    fn next_value(&mut self) -> Option<U> {
        self.source.next_value().map(&mut self.f)
    }

    fn restart(&mut self) -> bool {
        self.source.restart()
    }

    fn can_restart(&self) -> bool {
        self.source.can_restart()
    }
}

/// Series returned by [`Series::select`].
pub struct Select<S, F> {
    source: S,
    predicate: F,
}

impl<S, F> Select<S, F> {
    pub(crate) fn new(source: S, predicate: F) -> Self {
        Self { source, predicate }
    }
}

impl<S, F> Series for Select<S, F>
where
    S: Series,
    F: FnMut(&S::Item) -> bool + Send,
{
    type Item = S::Item;

    fn next_value(&mut self) -> Option<S::Item> {
        while let Some(value) = self.source.next_value() {
            if (self.predicate)(&value) {
                return Some(value);
            }
        }
        None
    }

    fn restart(&mut self) -> bool {
        self.source.restart()
    }

    fn can_restart(&self) -> bool {
        self.source.can_restart()
    }
}

/// Series returned by [`Series::reverse`].
pub struct Reverse<S: Series> {
    source: S,
    drained: Option<Vec<S::Item>>,
}

impl<S: Series> Reverse<S> {
    pub(crate) fn new(source: S) -> Self {
        Self {
            source,
            drained: None,
        }
    }
}

impl<S> Series for Reverse<S>
where
    S: Series,
    S::Item: Send,
{
    type Item = S::Item;

    fn next_value(&mut self) -> Option<S::Item> {
        let source = &mut self.source;
        self.drained
            .get_or_insert_with(|| {
                let mut values = Vec::new();
                while let Some(value) = source.next_value() {
                    values.push(value);
                }
                values
            })
            .pop()
    }

    fn restart(&mut self) -> bool {
        if !self.source.restart() {
            return false;
        }
        self.drained = None;
        true
    }

    fn can_restart(&self) -> bool {
        self.source.can_restart()
    }
}

/// Series returned by [`Series::max_size`].
pub struct MaxSize<S> {
    source: S,
    max: usize,
    taken: usize,
}

impl<S> MaxSize<S> {
    pub(crate) fn new(source: S, max: usize) -> Self {
        Self {
            source,
            max,
            taken: 0,
        }
    }
}

impl<S: Series> Series for MaxSize<S> {
    type Item = S::Item;

    #[inline]
    fn next_value(&mut self) -> Option<S::Item> {
        if self.taken >= self.max {
            return None;
        }
        let value = self.source.next_value()?;
        self.taken += 1;
        Some(value)
    }

    fn restart(&mut self) -> bool {
        if !self.source.restart() {
            return false;
        }
        self.taken = 0;
        true
    }

    fn can_restart(&self) -> bool {
        self.source.can_restart()
    }
}

#[cfg(test)]
mod tests {
    use crate::{count_from, for_range, from_iter, s, Series};

    #[test]
    fn test_map_is_lazy() {
        let mut calls = 0;
        {
            let mut mapped = s(vec![1, 2, 3]).map(|n| {
                calls += 1;
                n * 10
            });
            assert_eq!(mapped.next_value(), Some(10));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_select_over_infinite_source() {
        let evens: Vec<i64> = count_from(1, 1)
            .unwrap()
            .select(|n| n % 2 == 0)
            .max_size(4)
            .iter()
            .collect();
        assert_eq!(evens, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_reverse() {
        let values: Vec<i32> = for_range(1, 4, 1).unwrap().reverse().iter().collect();
        assert_eq!(values, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_reverse_restart() {
        let mut reversed = s(vec!['a', 'b', 'c']).reverse();
        assert_eq!(reversed.next_value(), Some('c'));
        assert!(reversed.restart());
        assert_eq!(reversed.iter().collect::<String>(), "cba");
    }

    #[test]
    fn test_reverse_of_one_shot_cannot_restart() {
        let mut reversed = from_iter(vec![1, 2]).reverse();
        assert_eq!(reversed.next_value(), Some(2));
        assert!(!reversed.restart());
        assert_eq!(reversed.next_value(), Some(1));
        assert_eq!(reversed.next_value(), None);
    }

    #[test]
    fn test_max_size_caps_and_stays_exhausted() {
        let mut capped = count_from(0, 1).unwrap().max_size(2);
        assert_eq!(capped.next_value(), Some(0));
        assert_eq!(capped.next_value(), Some(1));
        assert_eq!(capped.next_value(), None);
        assert_eq!(capped.next_value(), None);
    }

    #[test]
    fn test_max_size_zero() {
        assert_eq!(s(vec![1]).max_size(0).next_value(), None);
    }
}
