/*!
 * Futex-Based Wait Strategy
 *
 * Direct proxy to the Linux futex syscall using the process-private
 * operation codes. No bookkeeping of its own: the kernel keeps the waiter
 * queue keyed by address.
 */

use super::config::timeout_millis;
use super::traits::{WaitStrategy, WakeResult};
use nix::errno::Errno;
use std::ptr;
use std::sync::atomic::AtomicI32;
use std::time::Duration;
use tracing::{trace, warn};

const FUTEX_WAIT_PRIVATE: libc::c_int = libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG;
const FUTEX_WAKE_PRIVATE: libc::c_int = libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG;

/// Futex-based wait strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct FutexWait;

impl FutexWait {
    /// Create the futex strategy
    pub const fn new() -> Self {
        Self
    }
}

#[inline]
fn futex(atom: &AtomicI32, op: libc::c_int, val: i32, ts: Option<&libc::timespec>) -> libc::c_long {
    let ts_ptr = ts.map_or(ptr::null(), |t| t as *const libc::timespec);

    // SAFETY: `atom` is a live, aligned 4-byte word for the whole call; the
    // kernel only reads it. `ts_ptr` is null or points at a timespec on our stack.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atom.as_ptr(),
            op,
            val,
            ts_ptr,
            ptr::null::<u32>(),
            0i32,
        )
    }
}

/// Relative timeout as seconds plus nanosecond remainder
fn ms_to_timespec(ms: u64) -> libc::timespec {
    libc::timespec {
        tv_sec: libc::time_t::try_from(ms / 1000).unwrap_or(libc::time_t::MAX),
        tv_nsec: ((ms % 1000) * 1_000_000) as libc::c_long,
    }
}

fn absorb_wait_error(rc: libc::c_long) {
    if rc != -1 {
        return;
    }
    match Errno::last() {
        // Value already differed, signal interruption, or timeout: all spurious to us
        errno @ (Errno::EAGAIN | Errno::EINTR | Errno::ETIMEDOUT) => {
            trace!(%errno, "futex wait returned early");
        }
        errno => warn!(%errno, "futex wait failed"),
    }
}

fn wake(atom: &AtomicI32, count: i32) -> WakeResult {
    let rc = futex(atom, FUTEX_WAKE_PRIVATE, count, None);
    if rc < 0 {
        warn!(errno = %Errno::last(), "futex wake failed");
        return WakeResult::NoWaiters;
    }
    WakeResult::from_count(rc as usize)
}

impl WaitStrategy for FutexWait {
    fn wait(&self, atom: &AtomicI32, expected: i32) {
        absorb_wait_error(futex(atom, FUTEX_WAIT_PRIVATE, expected, None));
    }

    fn wait_for(&self, atom: &AtomicI32, expected: i32, timeout: Duration) {
        let ts = ms_to_timespec(timeout_millis(timeout));
        absorb_wait_error(futex(atom, FUTEX_WAIT_PRIVATE, expected, Some(&ts)));
    }

    fn notify_one(&self, atom: &AtomicI32) -> WakeResult {
        wake(atom, 1)
    }

    fn notify_all(&self, atom: &AtomicI32) -> WakeResult {
        wake(atom, i32::MAX)
    }

    fn name(&self) -> &'static str {
        "futex"
    }
}
