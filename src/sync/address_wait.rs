/*!
 * Address-Wait Strategy
 *
 * Proxies to `WaitOnAddress` / `WakeByAddressSingle` / `WakeByAddressAll`.
 * The OS compares the word against the expected value and keeps its own
 * waiter queue, so there is nothing to track here.
 */

use super::config::timeout_millis;
use super::traits::{WaitStrategy, WakeResult};
use std::ffi::c_void;
use std::mem::size_of;
use std::sync::atomic::AtomicI32;
use std::time::Duration;
use tracing::trace;
use windows_sys::Win32::System::Threading::{
    WaitOnAddress, WakeByAddressAll, WakeByAddressSingle, INFINITE,
};

/// Address-wait strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressWait;

impl AddressWait {
    /// Create the address-wait strategy
    pub const fn new() -> Self {
        Self
    }
}

#[inline]
fn address_of(atom: &AtomicI32) -> *const c_void {
    atom.as_ptr() as *const c_void
}

fn wait_on_address(atom: &AtomicI32, expected: i32, millis: u32) {
    // SAFETY: both pointers refer to live 4-byte values for the whole call.
    let ok = unsafe {
        WaitOnAddress(
            address_of(atom),
            &expected as *const i32 as *const c_void,
            size_of::<i32>(),
            millis,
        )
    };
    if ok == 0 {
        trace!(millis, "WaitOnAddress returned without wake");
    }
}

impl WaitStrategy for AddressWait {
    fn wait(&self, atom: &AtomicI32, expected: i32) {
        wait_on_address(atom, expected, INFINITE);
    }

    fn wait_for(&self, atom: &AtomicI32, expected: i32, timeout: Duration) {
        // INFINITE is u32::MAX, so bounded waits stay strictly below it
        let millis = timeout_millis(timeout).min(u64::from(INFINITE - 1)) as u32;
        wait_on_address(atom, expected, millis);
    }

    fn notify_one(&self, atom: &AtomicI32) -> WakeResult {
        // SAFETY: the address is only used as a key by the OS.
        unsafe { WakeByAddressSingle(address_of(atom)) };
        WakeResult::Unreported
    }

    fn notify_all(&self, atom: &AtomicI32) -> WakeResult {
        // SAFETY: the address is only used as a key by the OS.
        unsafe { WakeByAddressAll(address_of(atom)) };
        WakeResult::Unreported
    }

    fn name(&self) -> &'static str {
        "address-wait"
    }
}
