/*!
 * Wait Strategy Traits
 *
 * The operation set every backend provides: block on a 4-byte word while it
 * holds an expected value, and wake threads blocked on that word.
 *
 * # Design: One Trait, Three Strategies
 *
 * Native address-wait, native futex, and the portable wait table all
 * implement `WaitStrategy`. Exactly one of them is bound at build time (see
 * `config::ACTIVE_STRATEGY`), so the entry points in `native` compile down
 * to a direct call with no dispatch.
 */

use std::sync::atomic::AtomicI32;
use std::time::Duration;

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
    /// The OS primitive does not report how many threads it woke
    Unreported,
}

impl WakeResult {
    /// Build from a raw count
    #[inline(always)]
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }

    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none or unknown)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters | WakeResult::Unreported => 0,
        }
    }
}

/// Strategy for blocking on a watched word
///
/// Implementations must be:
/// - **Thread-safe**: Safe to call from multiple threads
/// - **Infallible**: no operation reports an error; a failure degrades to an
///   immediate return from `wait`/`wait_for` or a notify with no effect
///
/// Waits are single-shot. A return says nothing about whether the value
/// changed or a notify arrived; callers reload and recheck.
pub trait WaitStrategy: Send + Sync {
    /// Block while `atom` holds `expected`, until notified
    ///
    /// May return spuriously.
    fn wait(&self, atom: &AtomicI32, expected: i32);

    /// Like [`WaitStrategy::wait`], bounded by `timeout`
    ///
    /// Does not distinguish notify, spurious wake, and timeout.
    fn wait_for(&self, atom: &AtomicI32, expected: i32, timeout: Duration);

    /// Wake at least one thread blocked on this exact address, if any
    fn notify_one(&self, atom: &AtomicI32) -> WakeResult;

    /// Wake every thread blocked on this exact address
    fn notify_all(&self, atom: &AtomicI32) -> WakeResult;

    /// Get strategy name for debugging
    fn name(&self) -> &'static str;
}
