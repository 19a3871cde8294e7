//! Shared memo buffer with independent read cursors.
//!
//! A [`Buffered`] owns the unconsumed tail of its source and an append-only
//! store of every value pulled so far. Each [`Cursor`] reads the store at its
//! own offset and only extends it when it reaches the end, so every cursor
//! observes the same value at the same index whatever order they advance in.

use crate::series::{BoxSeries, Series};
use parking_lot::Mutex;
use std::sync::Arc;

struct Store<T> {
    values: Vec<T>,
    source: BoxSeries<'static, T>,
    exhausted: bool,
}

impl<T: Clone> Store<T> {
    /// Value at `index`, extending the store from the source if needed.
    fn value_at(&mut self, index: usize) -> Option<T> {
        while self.values.len() <= index {
            if self.exhausted {
                return None;
            }
            match self.source.next_value() {
                Some(value) => self.values.push(value),
                None => self.exhausted = true,
            }
        }
        Some(self.values[index].clone())
    }
}

/// Factory for cursors over one shared buffer. Cloning shares the buffer.
pub struct Buffered<T> {
    store: Arc<Mutex<Store<T>>>,
}

impl<T> Clone for Buffered<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Clone + Send + 'static> Buffered<T> {
    pub fn new<S>(source: S) -> Self
    where
        S: Series<Item = T> + 'static,
    {
        Self {
            store: Arc::new(Mutex::new(Store {
                values: Vec::new(),
                source: source.boxed(),
                exhausted: false,
            })),
        }
    }

    /// Open a new reader positioned at the first element.
    pub fn cursor(&self) -> Cursor<T> {
        Cursor {
            store: Arc::clone(&self.store),
            offset: 0,
        }
    }

    /// Number of values pulled from the source so far.
    pub fn buffered_len(&self) -> usize {
        self.store.lock().values.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.store.lock().exhausted
    }
}

/// Independent reader over a [`Buffered`] store.
pub struct Cursor<T> {
    store: Arc<Mutex<Store<T>>>,
    offset: usize,
}

impl<T> Cursor<T> {
    /// Index of the next value this cursor will read.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A cloned cursor starts at the same offset and then advances on its own.
impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            offset: self.offset,
        }
    }
}

impl<T: Clone + Send> Series for Cursor<T> {
    type Item = T;

    fn next_value(&mut self) -> Option<T> {
        let value = self.store.lock().value_at(self.offset)?;
        self.offset += 1;
        Some(value)
    }

    /// Rewinds this cursor only; the shared store is untouched.
    fn restart(&mut self) -> bool {
        self.offset = 0;
        true
    }

    fn can_restart(&self) -> bool {
        true
    }
}
