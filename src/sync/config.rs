/*!
 * Synchronization Configuration
 *
 * Build-time backend selection and the constants shared by every backend
 */

use std::time::Duration;

/// Number of buckets in the process-wide wait table (prime for even spread)
pub const TABLE_SIZE: usize = 257;

/// Strategy type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    /// `WaitOnAddress` / `WakeByAddress*` (Windows)
    AddressWait,
    /// Private futex syscall (Linux, Android)
    Futex,
    /// Portable sharded wait table (everything else, or `fallback` feature)
    Table,
}

impl StrategyType {
    /// Short name, matching `WaitStrategy::name` of the backend
    pub const fn name(self) -> &'static str {
        match self {
            StrategyType::AddressWait => "address-wait",
            StrategyType::Futex => "futex",
            StrategyType::Table => "table",
        }
    }

    /// Whether this strategy proxies to an OS primitive
    pub const fn is_native(self) -> bool {
        !matches!(self, StrategyType::Table)
    }
}

/// Strategy compiled into this build
#[cfg(all(windows, not(feature = "fallback")))]
pub const ACTIVE_STRATEGY: StrategyType = StrategyType::AddressWait;

/// Strategy compiled into this build
#[cfg(all(
    any(target_os = "linux", target_os = "android"),
    not(feature = "fallback")
))]
pub const ACTIVE_STRATEGY: StrategyType = StrategyType::Futex;

/// Strategy compiled into this build
#[cfg(any(
    feature = "fallback",
    not(any(windows, target_os = "linux", target_os = "android"))
))]
pub const ACTIVE_STRATEGY: StrategyType = StrategyType::Table;

/// Convert a timeout to whole milliseconds, rounding up
///
/// A non-zero timeout never becomes a zero-length wait.
#[inline]
pub fn timeout_millis(timeout: Duration) -> u64 {
    let millis = timeout.as_millis();
    let rounded = if timeout.subsec_nanos() % 1_000_000 != 0 {
        millis + 1
    } else {
        millis
    };
    u64::try_from(rounded).unwrap_or(u64::MAX)
}
