/*!
 * Synchronization Primitives Integration Tests
 *
 * Typed wait/notify against whichever strategy this build selected
 */

use atomic_wait::sync::{strategy_name, StrategyType, ACTIVE_STRATEGY};
use atomic_wait::{
    atomic_notify_all, atomic_notify_one, atomic_wait, atomic_wait_for, init_tracing, WaitStatus,
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Poll `cond` until it holds or `limit` passes
fn eventually(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

fn spawn_waiters(flag: &Arc<AtomicI32>, woken: &Arc<AtomicUsize>, count: usize) -> Vec<thread::JoinHandle<()>> {
    (0..count)
        .map(|_| {
            let flag = flag.clone();
            let woken = woken.clone();
            thread::spawn(move || {
                atomic_wait(&*flag, 0, Ordering::Relaxed);
                woken.fetch_add(1, Ordering::AcqRel);
            })
        })
        .collect()
}

#[test]
fn test_strategy_auto_selection() {
    init_tracing();

    #[cfg(all(target_os = "linux", not(feature = "fallback")))]
    assert_eq!(strategy_name(), "futex");

    #[cfg(all(windows, not(feature = "fallback")))]
    assert_eq!(strategy_name(), "address-wait");

    #[cfg(feature = "fallback")]
    assert_eq!(ACTIVE_STRATEGY, StrategyType::Table);

    assert_eq!(strategy_name(), ACTIVE_STRATEGY.name());
    assert_eq!(ACTIVE_STRATEGY.is_native(), ACTIVE_STRATEGY != StrategyType::Table);
}

#[test]
#[serial]
fn test_wait_ignores_stale_notify_and_silent_change() {
    let flag = Arc::new(AtomicI32::new(0));
    let woken = Arc::new(AtomicBool::new(false));

    let waiter = {
        let flag = flag.clone();
        let woken = woken.clone();
        thread::spawn(move || {
            atomic_wait(&*flag, 0, Ordering::Acquire);
            woken.store(true, Ordering::Release);
        })
    };

    thread::sleep(Duration::from_millis(500));
    assert!(!woken.load(Ordering::Acquire));

    // notify was called, but value hadn't changed
    for _ in 0..5 {
        atomic_notify_one(&*flag);
        thread::sleep(Duration::from_millis(100));
        assert!(!woken.load(Ordering::Acquire));
    }

    // value had changed, but notify wasn't called
    flag.store(1, Ordering::Release);
    thread::sleep(Duration::from_millis(500));
    assert!(!woken.load(Ordering::Acquire));

    atomic_notify_one(&*flag);
    assert!(eventually(Duration::from_millis(250), || woken.load(Ordering::Acquire)));

    waiter.join().unwrap();
}

#[test]
#[serial]
fn test_wait_for_timeout_without_activity() {
    let flag = AtomicI32::new(0);
    let timeout = Duration::from_millis(100);

    let start = Instant::now();
    let result = atomic_wait_for(&flag, 0, timeout, Ordering::Acquire);

    assert_eq!(result, WaitStatus::Timeout);
    assert!(start.elapsed() >= timeout);
}

#[test]
#[serial]
fn test_wait_for_notify_without_change_times_out() {
    let flag = Arc::new(AtomicI32::new(0));
    let timeout = Duration::from_millis(200);

    let notifier = {
        let flag = flag.clone();
        thread::spawn(move || {
            thread::sleep(timeout / 2);
            atomic_notify_one(&*flag);
        })
    };

    let start = Instant::now();
    let result = atomic_wait_for(&*flag, 0, timeout, Ordering::Acquire);
    let elapsed = start.elapsed();

    assert_eq!(result, WaitStatus::Timeout);
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + Duration::from_millis(500));

    notifier.join().unwrap();
}

#[test]
#[serial]
fn test_wait_for_change_without_notify_is_ok() {
    let flag = Arc::new(AtomicI32::new(0));
    let timeout = Duration::from_millis(200);

    let modifier = {
        let flag = flag.clone();
        thread::spawn(move || {
            thread::sleep(timeout / 2);
            flag.store(1, Ordering::Release);
        })
    };

    let start = Instant::now();
    let result = atomic_wait_for(&*flag, 0, timeout, Ordering::Acquire);
    let elapsed = start.elapsed();

    // The value changed, so the timeout is not reported even if it was reached
    assert_eq!(result, WaitStatus::Ok);
    assert!(elapsed >= timeout / 2);
    assert!(elapsed < timeout + Duration::from_millis(500));

    modifier.join().unwrap();
}

#[test]
#[serial]
fn test_wait_for_success_returns_near_change() {
    let flag = Arc::new(AtomicI32::new(0));
    let timeout = Duration::from_millis(2_000);
    let modify_after = Duration::from_millis(100);

    let modifier = {
        let flag = flag.clone();
        thread::spawn(move || {
            thread::sleep(modify_after);
            flag.store(1, Ordering::Release);
            atomic_notify_one(&*flag);
        })
    };

    let start = Instant::now();
    let result = atomic_wait_for(&*flag, 0, timeout, Ordering::Acquire);
    let elapsed = start.elapsed();

    assert_eq!(result, WaitStatus::Ok);
    assert!(elapsed >= modify_after);
    assert!(elapsed < timeout / 2);

    modifier.join().unwrap();
}

#[test]
#[serial]
fn test_notify_one_wakes_one_per_call() {
    let flag = Arc::new(AtomicI32::new(0));
    let woken = Arc::new(AtomicUsize::new(0));
    let waiters = spawn_waiters(&flag, &woken, 5);

    // Give threads time to block
    thread::sleep(Duration::from_millis(200));

    flag.store(1, Ordering::Relaxed);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(woken.load(Ordering::Acquire), 0);

    for i in 0..waiters.len() {
        atomic_notify_one(&*flag);
        assert!(eventually(Duration::from_secs(1), || woken.load(Ordering::Acquire) == i + 1));
        thread::sleep(Duration::from_millis(15));
        assert_eq!(woken.load(Ordering::Acquire), i + 1);
    }

    for waiter in waiters {
        waiter.join().unwrap();
    }
}

#[test]
#[serial]
fn test_notify_all_wakes_everyone() {
    let flag = Arc::new(AtomicI32::new(0));
    let woken = Arc::new(AtomicUsize::new(0));
    let waiters = spawn_waiters(&flag, &woken, 5);

    thread::sleep(Duration::from_millis(200));

    flag.store(1, Ordering::Relaxed);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(woken.load(Ordering::Acquire), 0);

    atomic_notify_all(&*flag);
    assert!(eventually(Duration::from_secs(1), || woken.load(Ordering::Acquire) == 5));

    for waiter in waiters {
        waiter.join().unwrap();
    }
}

#[test]
fn test_concurrent_different_cells() {
    let cells: Arc<Vec<AtomicU32>> = Arc::new((0..10).map(|_| AtomicU32::new(0)).collect());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let cells = cells.clone();
            thread::spawn(move || {
                atomic_wait_for(&cells[i], 0, Duration::from_secs(5), Ordering::Acquire)
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));

    for cell in cells.iter() {
        cell.store(1, Ordering::Release);
        atomic_notify_one(cell);
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), WaitStatus::Ok);
    }
}

#[test]
fn test_sentinel_cancellation() {
    // Callers cancel by writing a sentinel and notifying
    const CANCELLED: i32 = -1;
    let state = Arc::new(AtomicI32::new(0));

    let waiter = {
        let state = state.clone();
        thread::spawn(move || {
            atomic_wait(&*state, 0, Ordering::Acquire);
            state.load(Ordering::Acquire)
        })
    };

    thread::sleep(Duration::from_millis(20));
    state.store(CANCELLED, Ordering::Release);
    atomic_notify_all(&*state);

    assert_eq!(waiter.join().unwrap(), CANCELLED);
}

#[test]
fn test_high_frequency_ping_pong() {
    let turn = Arc::new(AtomicU32::new(0));
    const ROUNDS: u32 = 1_000;

    let ponger = {
        let turn = turn.clone();
        thread::spawn(move || {
            for round in 0..ROUNDS {
                let mine = round * 2 + 1;
                while turn.load(Ordering::Acquire) != mine {
                    atomic_wait(&*turn, mine - 1, Ordering::Acquire);
                }
                turn.store(mine + 1, Ordering::Release);
                atomic_notify_one(&*turn);
            }
        })
    };

    for round in 0..ROUNDS {
        let mine = round * 2;
        while turn.load(Ordering::Acquire) != mine {
            atomic_wait(&*turn, mine - 1, Ordering::Acquire);
        }
        turn.store(mine + 1, Ordering::Release);
        atomic_notify_one(&*turn);
    }

    ponger.join().unwrap();
    assert!(eventually(Duration::from_secs(5), || {
        turn.load(Ordering::Acquire) == ROUNDS * 2
    }));
}
