/*!
 * Wait/Notify Primitives
 *
 * Block a thread until a watched 4-byte word changes or is explicitly
 * signaled: a user-space futex. Locks, events and condition variables are
 * built on top of this.
 *
 * # Architecture
 *
 * - `atomic`: typed API with the mandatory reload-and-retry loop
 * - `native`: the four raw operations, bound to one strategy per build
 * - Strategies: address-wait (Windows), futex (Linux/Android), and the
 *   portable `WaitTable` everywhere else
 *
 * Process-private only. No fairness or wake order is promised beyond
 * "at least the requested matching waiters"; spurious wakeups happen.
 */

mod atomic;
mod config;
mod native;
mod table;
mod traits;

#[cfg(windows)]
mod address_wait;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod futex;

// Re-export public API
pub use atomic::{
    atomic_notify_all, atomic_notify_one, atomic_wait, atomic_wait_for, AtomicWord, WaitStatus,
};
pub use config::{timeout_millis, StrategyType, ACTIVE_STRATEGY, TABLE_SIZE};
pub use native::{
    notify_all_native, notify_one_native, strategy_name, wait_for_native, wait_native,
};
pub use traits::{WaitStrategy, WakeResult};

// Re-export specific strategies for advanced users
#[cfg(windows)]
pub use address_wait::AddressWait;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use futex::FutexWait;
pub use table::WaitTable;
