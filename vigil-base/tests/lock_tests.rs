mod common;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

use common::Probe;
use vigil_base::{BaseObject, Object, lock_pair, make_object};

// ── Mutual exclusion ─────────────────────────────────────────────

#[test]
fn concurrent_increments_are_not_lost() {
    let probe = make_object(Probe::default());
    let barrier = Arc::new(Barrier::new(2));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let probe = Arc::clone(&probe);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..10_000 {
                    let mut state = probe.lock();
                    state.count += 1;
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(probe.lock().count, 20_000);
}

#[test]
fn guarded_sections_never_overlap() {
    let object = make_object(BaseObject::default());
    let inside = Arc::new(AtomicBool::new(false));
    let counter = Arc::new(AtomicU64::new(0));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let object = Arc::clone(&object);
            let inside = Arc::clone(&inside);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let _guard = object.lock();
                    assert!(!inside.swap(true, Ordering::SeqCst), "guarded sections overlapped");
                    // Non-atomic read-modify-write; only safe under the lock.
                    let seen = counter.load(Ordering::Relaxed);
                    counter.store(seen + 1, Ordering::Relaxed);
                    inside.store(false, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 8_000);
}

#[test]
fn contended_lock_blocks_until_released() {
    let probe = make_object(Probe::default());
    let (locked_tx, locked_rx) = mpsc::channel();

    let guard = probe.lock();
    let remote = Arc::clone(&probe);
    let waiter = thread::spawn(move || {
        let mut state = remote.lock();
        state.count = 7;
        locked_tx.send(()).unwrap();
    });

    assert!(locked_rx.recv_timeout(Duration::from_millis(100)).is_err());
    drop(guard);
    locked_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    waiter.join().unwrap();
    assert_eq!(probe.lock().count, 7);
}

#[test]
fn lock_is_released_when_guarded_section_panics() {
    let probe = make_object(Probe::default());
    let remote = Arc::clone(&probe);
    let result = thread::spawn(move || {
        let _guard = remote.lock();
        panic!("boom");
    })
    .join();
    assert!(result.is_err());

    let mut state = probe.lock();
    state.count += 1;
    assert_eq!(state.count, 1);
}

#[test]
fn each_lock_is_keyed_by_its_object() {
    let a = make_object(Probe::default());
    let b = make_object(Probe::default());
    assert_eq!(a.mutex().object_id(), a.object_id());
    assert_eq!(a.lock().object_id(), a.object_id());
    assert_ne!(a.mutex().object_id(), b.mutex().object_id());
}

// ── Canonical ordering ───────────────────────────────────────────

#[test]
fn lock_pair_in_opposite_orders_does_not_deadlock() {
    let a = make_object(Probe::default());
    let b = make_object(Probe::default());

    let workers: Vec<_> = (0..2)
        .map(|i| {
            let a = Arc::clone(&a);
            let b = Arc::clone(&b);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let (x, y) = if i == 0 { (&a, &b) } else { (&b, &a) };
                    let (mut gx, mut gy) = lock_pair(x.mutex(), y.mutex());
                    gx.count += 1;
                    gy.count += 1;
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(a.lock().count, 4_000);
    assert_eq!(b.lock().count, 4_000);
}

#[test]
fn lock_pair_returns_guards_in_argument_order() {
    let a = make_object(Probe::default());
    let b = make_object(Probe::default());
    let (ga, gb) = lock_pair(b.mutex(), a.mutex());
    assert_eq!(ga.object_id(), b.object_id());
    assert_eq!(gb.object_id(), a.object_id());
}

#[test]
#[should_panic(expected = "lock_pair called twice")]
fn lock_pair_rejects_same_object() {
    let a = make_object(Probe::default());
    let _ = lock_pair(a.mutex(), a.mutex());
}

// ── Debug-build ownership tracking ───────────────────────────────

#[cfg(debug_assertions)]
mod debug_tracking {
    use super::*;
    use vigil_base::locks_held_by_current_thread;

    #[test]
    fn holder_sees_ownership_and_other_thread_does_not() {
        let probe = make_object(Probe::default());
        assert!(!probe.owns_lock());

        let guard = probe.lock();
        assert!(probe.owns_lock());

        let remote = Arc::clone(&probe);
        let seen_remotely = thread::spawn(move || remote.owns_lock()).join().unwrap();
        assert!(!seen_remotely);

        drop(guard);
        assert!(!probe.owns_lock());
    }

    #[test]
    #[should_panic(expected = "already locked by the current thread")]
    fn relocking_on_holding_thread_panics() {
        let probe = make_object(Probe::default());
        let _guard = probe.lock();
        // get_field takes the lock again.
        let _ = probe.get_field(Probe::COUNT);
    }

    #[test]
    fn held_locks_are_listed_in_order() {
        let a = make_object(Probe::default());
        let b = make_object(Probe::default());
        let (_ga, _gb) = lock_pair(a.mutex(), b.mutex());

        let held = locks_held_by_current_thread();
        let mut expected = vec![a.object_id(), b.object_id()];
        expected.sort();
        assert!(held.windows(2).all(|w| w[0] < w[1]));
        assert!(expected.iter().all(|id| held.contains(id)));
    }
}

#[cfg(not(debug_assertions))]
#[test]
fn release_build_reports_no_ownership() {
    let probe = make_object(Probe::default());
    let _guard = probe.lock();
    assert!(!probe.owns_lock());
}
