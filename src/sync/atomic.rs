/*!
 * Typed Wait/Notify
 *
 * The layer callers use: wait on a typed atomic cell until its value
 * differs from an expected one, with or without a deadline.
 *
 * Backends return spuriously and never report why they woke, so both waits
 * reload after every return and only stop on a real change (or, for
 * `atomic_wait_for`, on the deadline).
 *
 * Wait/notify adds no ordering of its own. What a woken thread observes is
 * governed by the ordering of the load here and the store that preceded the
 * notify, exactly as for any other atomic access.
 */

use super::native::{notify_all_native, notify_one_native, wait_for_native, wait_native};
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Outcome of [`atomic_wait_for`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WaitStatus {
    /// A value different from the expected one was observed
    Ok,
    /// The timeout elapsed with the value still equal to the expected one
    Timeout,
}

impl WaitStatus {
    /// Check if the wait ran out of time
    #[inline]
    pub fn is_timeout(self) -> bool {
        self == WaitStatus::Timeout
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for std::sync::atomic::AtomicI32 {}
    impl Sealed for std::sync::atomic::AtomicU32 {}
}

/// An atomic cell backed by one aligned 4-byte word
pub trait AtomicWord: sealed::Sealed + Sync {
    /// Value stored in the cell
    type Value: Copy + Eq;

    /// Load with the given ordering
    fn load_value(&self, order: Ordering) -> Self::Value;

    /// The underlying word, as seen by the backends
    fn word(&self) -> &AtomicI32;

    /// Bit pattern of `value` as stored in the word
    fn to_word(value: Self::Value) -> i32;
}

impl AtomicWord for AtomicI32 {
    type Value = i32;

    #[inline]
    fn load_value(&self, order: Ordering) -> i32 {
        self.load(order)
    }

    #[inline]
    fn word(&self) -> &AtomicI32 {
        self
    }

    #[inline]
    fn to_word(value: i32) -> i32 {
        value
    }
}

impl AtomicWord for AtomicU32 {
    type Value = u32;

    #[inline]
    fn load_value(&self, order: Ordering) -> u32 {
        self.load(order)
    }

    #[inline]
    fn word(&self) -> &AtomicI32 {
        // SAFETY: AtomicU32 and AtomicI32 have identical size, alignment and
        // interior mutability; only the interpretation of the bits differs.
        unsafe { &*(self as *const AtomicU32 as *const AtomicI32) }
    }

    #[inline]
    fn to_word(value: u32) -> i32 {
        value as i32
    }
}

/// Block until `cell` holds a value other than `expected`
///
/// Returns at once if it already does.
///
/// # Panics
///
/// Panics if `order` is `Release` or `AcqRel`, like any atomic load.
pub fn atomic_wait<A: AtomicWord>(cell: &A, expected: A::Value, order: Ordering) {
    let word = A::to_word(expected);
    while cell.load_value(order) == expected {
        wait_native(cell.word(), word);
    }
}

/// Block until `cell` holds a value other than `expected`, or `timeout` elapses
///
/// Returns [`WaitStatus::Ok`] as soon as a different value is observed,
/// whether or not anyone notified. Returns [`WaitStatus::Timeout`] only
/// after at least `timeout` has passed with the value unchanged.
///
/// # Panics
///
/// Panics if `order` is `Release` or `AcqRel`, like any atomic load.
pub fn atomic_wait_for<A: AtomicWord>(
    cell: &A,
    expected: A::Value,
    timeout: Duration,
    order: Ordering,
) -> WaitStatus {
    let word = A::to_word(expected);
    let Some(deadline) = Instant::now().checked_add(timeout) else {
        // Unrepresentable deadline: nothing can time out
        atomic_wait(cell, expected, order);
        return WaitStatus::Ok;
    };

    loop {
        if cell.load_value(order) != expected {
            return WaitStatus::Ok;
        }

        let now = Instant::now();
        if now >= deadline {
            return WaitStatus::Timeout;
        }

        wait_for_native(cell.word(), word, deadline - now);
    }
}

/// Wake at least one thread waiting on `cell`
#[inline]
pub fn atomic_notify_one<A: AtomicWord>(cell: &A) {
    notify_one_native(cell.word());
}

/// Wake every thread waiting on `cell`
#[inline]
pub fn atomic_notify_all<A: AtomicWord>(cell: &A) {
    notify_all_native(cell.word());
}
