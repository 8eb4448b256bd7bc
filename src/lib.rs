/*!
 * Atomic Wait Library
 * Portable "wait on a value" primitive: block until a watched word changes
 */

pub mod errors;
pub mod monitoring;
pub mod sync;

// Re-exports
pub use errors::{TableError, TableResult};
pub use monitoring::init_tracing;
pub use sync::{
    atomic_notify_all, atomic_notify_one, atomic_wait, atomic_wait_for, AtomicWord, WaitStatus,
};
