//! Lock-free primitives shared between the transport loop and other threads.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Cache-line aligned atomic bool.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFlag {
    value: AtomicBool,
}

impl AtomicFlag {
    pub fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set.
    #[inline]
    pub fn take(&self) -> bool {
        self.value.swap(false, Ordering::AcqRel)
    }
}

impl Default for AtomicFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Fieldless enum stored as its `u8` discriminant.
pub(crate) trait AtomicRepr: Copy {
    fn to_u8(self) -> u8;
    fn from_u8(value: u8) -> Self;
}

/// Atomic cell for an [`AtomicRepr`] enum.
#[derive(Debug)]
pub(crate) struct AtomicEnum<T> {
    value: AtomicU8,
    _marker: core::marker::PhantomData<T>,
}

impl<T: AtomicRepr> AtomicEnum<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: AtomicU8::new(value.to_u8()),
            _marker: core::marker::PhantomData,
        }
    }

    #[inline]
    pub(crate) fn get(&self) -> T {
        T::from_u8(self.value.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn set(&self, value: T) {
        self.value.store(value.to_u8(), Ordering::Release);
    }

    /// Store `value`, returning the previous one.
    #[inline]
    pub(crate) fn replace(&self, value: T) -> T {
        T::from_u8(self.value.swap(value.to_u8(), Ordering::AcqRel))
    }
}
