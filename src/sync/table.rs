/*!
 * Wait Table
 *
 * Portable wait/notify for platforms without a native address-wait
 * primitive, built entirely from mutexes and condition variables.
 *
 * # Design
 *
 * A fixed, prime-sized array of cache-line aligned buckets. Each bucket
 * owns a mutex around a slot-indexed waiter list:
 * - Registration links a slot at the front of the list (O(1))
 * - Unregistration unlinks by index (O(1)) and never allocates
 * - Every slot carries a private condvar, kept across reuse
 * - Different addresses may share a bucket; every scan filters by exact address
 *
 * The value check and the registration both happen under the bucket lock,
 * and a notify scans under the same lock, so a notify can never fall
 * between "value still equal" and "asleep".
 *
 * Waits are single-shot: any wake unregisters and returns. The retry loop
 * lives in `atomic`.
 */

use super::config::{timeout_millis, TABLE_SIZE};
use super::traits::{WaitStrategy, WakeResult};
use crate::errors::TableResult;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::hash::Hasher;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

static GLOBAL_TABLE: OnceLock<WaitTable> = OnceLock::new();

/// Position of a registered waiter in its bucket's list
#[derive(Debug, Clone, Copy)]
struct Link {
    address: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot {
    /// `None` while vacant
    link: Option<Link>,
    signal: Arc<Condvar>,
}

/// Arena of waiter slots threaded into a doubly linked list by index
///
/// Invariant: `vacant` always has capacity for every slot, so `remove`
/// cannot allocate.
#[derive(Default)]
struct WaiterList {
    slots: Vec<Slot>,
    vacant: Vec<usize>,
    head: Option<usize>,
}

impl WaiterList {
    /// Link a waiter for `address` at the front, returning its slot index
    fn push_front(&mut self, address: usize) -> TableResult<usize> {
        let index = match self.vacant.pop() {
            Some(index) => index,
            None => {
                self.vacant.try_reserve(self.slots.len() + 1)?;
                self.slots.try_reserve(1)?;
                self.slots.push(Slot {
                    link: None,
                    signal: Arc::new(Condvar::new()),
                });
                self.slots.len() - 1
            }
        };

        if let Some(link) = self.head.and_then(|head| self.link_mut(head)) {
            link.prev = Some(index);
        }
        self.slots[index].link = Some(Link {
            address,
            prev: None,
            next: self.head,
        });
        self.head = Some(index);
        Ok(index)
    }

    /// Unlink the waiter in slot `index`
    fn remove(&mut self, index: usize) {
        let Some(link) = self.slots.get_mut(index).and_then(|slot| slot.link.take()) else {
            debug_assert!(false, "removing vacant wait slot {index}");
            return;
        };

        match link.prev.and_then(|prev| self.link_mut(prev)) {
            Some(prev) => prev.next = link.next,
            None => self.head = link.next,
        }
        if let Some(next) = link.next.and_then(|next| self.link_mut(next)) {
            next.prev = link.prev;
        }
        self.vacant.push(index);
    }

    #[inline]
    fn link_mut(&mut self, index: usize) -> Option<&mut Link> {
        self.slots.get_mut(index).and_then(|slot| slot.link.as_mut())
    }

    /// Front-to-back walk yielding `(address, signal)`
    fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Signal the first matching waiter still parked on its condvar
    ///
    /// A matching waiter that was already signaled, or timed out and is
    /// waiting for the bucket lock to unlink, reports no parked thread and
    /// is skipped.
    fn notify_one(&self, address: usize) -> WakeResult {
        let woken = self
            .iter()
            .filter(|(addr, _)| *addr == address)
            .any(|(_, signal)| signal.notify_one());
        WakeResult::from_count(usize::from(woken))
    }

    fn notify_all(&self, address: usize) -> WakeResult {
        let woken = self
            .iter()
            .filter(|(addr, _)| *addr == address)
            .filter(|(_, signal)| signal.notify_one())
            .count();
        WakeResult::from_count(woken)
    }

    fn count(&self, address: usize) -> usize {
        self.iter().filter(|(addr, _)| *addr == address).count()
    }
}

struct Iter<'a> {
    list: &'a WaiterList,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Condvar);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.list.slots.get(self.cursor?)?;
        let link = slot.link.as_ref()?;
        self.cursor = link.next;
        Some((link.address, &*slot.signal))
    }
}

/// A registered waiter, unlinked on drop
///
/// Holds the bucket lock except while asleep on its condvar.
struct WaitSlot<'a> {
    waiters: MutexGuard<'a, WaiterList>,
    index: usize,
    signal: Arc<Condvar>,
}

impl WaitSlot<'_> {
    /// Sleep until signaled (or `timeout` elapses), releasing the bucket lock meanwhile
    fn sleep(&mut self, timeout: Option<Duration>) {
        match timeout {
            Some(timeout) => {
                let _ = self.signal.wait_for(&mut self.waiters, timeout);
            }
            None => self.signal.wait(&mut self.waiters),
        }
    }
}

impl Drop for WaitSlot<'_> {
    fn drop(&mut self) {
        self.waiters.remove(self.index);
    }
}

/// One shard of the wait table
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
struct Bucket {
    waiters: Mutex<WaiterList>,
}

impl Bucket {
    fn new() -> Self {
        Self {
            waiters: Mutex::new(WaiterList::default()),
        }
    }

    /// Lock the bucket and link a new waiter for `address`
    fn register(&self, address: usize) -> TableResult<WaitSlot<'_>> {
        let mut waiters = self.waiters.lock();
        let index = waiters.push_front(address)?;
        let signal = Arc::clone(&waiters.slots[index].signal);
        Ok(WaitSlot {
            waiters,
            index,
            signal,
        })
    }
}

/// Sharded table of blocked waiters
///
/// # Performance
///
/// - Unrelated addresses in different buckets never contend
/// - No allocation per wait once a bucket's arena has warmed up
/// - O(1) registration and removal, O(bucket waiters) notify scan
pub struct WaitTable {
    buckets: Box<[Bucket]>,
}

impl WaitTable {
    /// Create a table with the default bucket count
    pub fn new() -> Self {
        Self::with_buckets(TABLE_SIZE)
    }

    /// Create a table with `count` buckets (at least one)
    pub fn with_buckets(count: usize) -> Self {
        let buckets = (0..count.max(1)).map(|_| Bucket::new()).collect();
        Self { buckets }
    }

    /// The process-wide table, built on first use
    pub fn global() -> &'static WaitTable {
        GLOBAL_TABLE.get_or_init(|| {
            debug!(buckets = TABLE_SIZE, "Wait table initialized");
            WaitTable::new()
        })
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Hash address to bucket index
    #[inline]
    pub(crate) fn bucket_index(&self, address: usize) -> usize {
        let mut hasher = ahash::AHasher::default();
        hasher.write_usize(address);
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    #[inline]
    fn bucket_for(&self, address: usize) -> &Bucket {
        &self.buckets[self.bucket_index(address)]
    }

    /// Registered waiters on this exact address (for diagnostics)
    pub fn waiter_count(&self, atom: &AtomicI32) -> usize {
        let address = address_of(atom);
        self.bucket_for(address).waiters.lock().count(address)
    }

    fn park(&self, atom: &AtomicI32, expected: i32, timeout: Option<Duration>) {
        let address = address_of(atom);
        let mut slot = match self.bucket_for(address).register(address) {
            Ok(slot) => slot,
            Err(err) => {
                warn!(error = %err, address, "Wait table registration failed, returning early");
                return;
            }
        };

        // The bucket lock orders this load against any notify
        if atom.load(Ordering::Relaxed) != expected {
            return;
        }

        slot.sleep(timeout);
    }
}

impl Default for WaitTable {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn address_of(atom: &AtomicI32) -> usize {
    atom.as_ptr() as usize
}

impl WaitStrategy for WaitTable {
    fn wait(&self, atom: &AtomicI32, expected: i32) {
        self.park(atom, expected, None);
    }

    fn wait_for(&self, atom: &AtomicI32, expected: i32, timeout: Duration) {
        let timeout = Duration::from_millis(timeout_millis(timeout));
        self.park(atom, expected, Some(timeout));
    }

    fn notify_one(&self, atom: &AtomicI32) -> WakeResult {
        let address = address_of(atom);
        self.bucket_for(address).waiters.lock().notify_one(address)
    }

    fn notify_all(&self, atom: &AtomicI32) -> WakeResult {
        let address = address_of(atom);
        self.bucket_for(address).waiters.lock().notify_all(address)
    }

    fn name(&self) -> &'static str {
        "table"
    }
}
