/*!
 * Raw Wait/Notify Entry Points
 *
 * The four operations over a 4-byte word, bound to whichever strategy this
 * build selected. None of them fail: errors below this line turn into an
 * early return or a notify with no effect.
 */

use super::traits::WaitStrategy;
use std::sync::atomic::AtomicI32;
use std::time::Duration;

#[cfg(all(windows, not(feature = "fallback")))]
#[inline(always)]
fn strategy() -> &'static super::address_wait::AddressWait {
    static STRATEGY: super::address_wait::AddressWait = super::address_wait::AddressWait::new();
    &STRATEGY
}

#[cfg(all(
    any(target_os = "linux", target_os = "android"),
    not(feature = "fallback")
))]
#[inline(always)]
fn strategy() -> &'static super::futex::FutexWait {
    static STRATEGY: super::futex::FutexWait = super::futex::FutexWait::new();
    &STRATEGY
}

#[cfg(any(
    feature = "fallback",
    not(any(windows, target_os = "linux", target_os = "android"))
))]
#[inline(always)]
fn strategy() -> &'static super::table::WaitTable {
    super::table::WaitTable::global()
}

/// Name of the strategy serving the raw entry points
pub fn strategy_name() -> &'static str {
    strategy().name()
}

/// Block while `atom` holds `expected`, until notified
///
/// May return spuriously; callers reload and recheck.
#[inline]
pub fn wait_native(atom: &AtomicI32, expected: i32) {
    strategy().wait(atom, expected);
}

/// Block while `atom` holds `expected`, for at most `timeout`
///
/// Returns on notify, spurious wake, or timeout without saying which.
#[inline]
pub fn wait_for_native(atom: &AtomicI32, expected: i32, timeout: Duration) {
    strategy().wait_for(atom, expected, timeout);
}

/// Wake at least one thread blocked on `atom`, if any
#[inline]
pub fn notify_one_native(atom: &AtomicI32) {
    strategy().notify_one(atom);
}

/// Wake every thread blocked on `atom`
#[inline]
pub fn notify_all_native(atom: &AtomicI32) {
    strategy().notify_all(atom);
}
