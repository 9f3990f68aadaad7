//! Concurrent access tests: exactly-once construction, scope isolation,
//! and the absence of global serialization.

use bindery::{BindingSet, Container, Resolver, ScopeKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn fifty_threads_construct_a_singleton_exactly_once() {
    struct Expensive {
        marker: usize,
    }

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    let mut bindings = BindingSet::new();
    bindings.add_singleton_factory::<Expensive, _>(move |_| {
        let marker = counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        Expensive { marker }
    });

    let container = bindings.build();
    let barrier = Arc::new(Barrier::new(50));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.get::<Expensive>().unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<Expensive>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &instances[0]));
        assert_eq!(instance.marker, 0);
    }
}

#[test]
fn concurrent_prototype_resolutions_are_all_distinct() {
    struct Probe;

    let mut bindings = BindingSet::new();
    bindings.add_prototype_factory::<Probe, _>(|_| Probe);

    let container = bindings.build();
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.get::<Probe>().unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<Probe>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (i, a) in instances.iter().enumerate() {
        for b in &instances[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
        }
    }
}

#[test]
fn unrelated_singletons_do_not_serialize_each_other() {
    struct Slow;
    struct Fast;

    let mut bindings = BindingSet::new();
    bindings.add_singleton_factory::<Slow, _>(|_| {
        thread::sleep(Duration::from_millis(200));
        Slow
    });
    bindings.add_singleton_factory::<Fast, _>(|_| Fast);

    let container = bindings.build();

    let slow_container = container.clone();
    let slow = thread::spawn(move || {
        slow_container.get::<Slow>().unwrap();
    });

    // Give the slow construction time to take its binding lock.
    thread::sleep(Duration::from_millis(20));
    let started = std::time::Instant::now();
    container.get::<Fast>().unwrap();
    let elapsed = started.elapsed();

    // Per-binding locking: Fast must not wait for Slow's constructor.
    assert!(
        elapsed < Duration::from_millis(100),
        "Fast resolution blocked for {:?}",
        elapsed
    );
    slow.join().unwrap();
}

#[test]
fn concurrent_session_resolutions_cache_once_per_key() {
    struct State {
        serial: usize,
    }

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    let mut bindings = BindingSet::new();
    bindings
        .bind::<State>()
        .scope(ScopeKind::Session)
        .to_factory(move |_| {
            let serial = counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            State { serial }
        });

    let container = bindings.build();
    container.begin_session("alice");
    container.begin_session("bob");

    fn spawn_getters(
        container: &Container,
        session: &'static str,
        barrier: &Arc<Barrier>,
    ) -> Vec<thread::JoinHandle<Arc<State>>> {
        (0..8)
            .map(|_| {
                let scoped = container.scoped().session(session);
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    scoped.get::<State>().unwrap()
                })
            })
            .collect()
    }

    let barrier = Arc::new(Barrier::new(16));
    let alice_handles = spawn_getters(&container, "alice", &barrier);
    let bob_handles = spawn_getters(&container, "bob", &barrier);

    let alice: Vec<_> = alice_handles.into_iter().map(|h| h.join().unwrap()).collect();
    let bob: Vec<_> = bob_handles.into_iter().map(|h| h.join().unwrap()).collect();

    // One construction per active key, no matter how many racers.
    assert_eq!(constructions.load(Ordering::SeqCst), 2);
    for a in &alice {
        assert!(Arc::ptr_eq(a, &alice[0]));
    }
    for b in &bob {
        assert!(Arc::ptr_eq(b, &bob[0]));
    }
    assert_ne!(alice[0].serial, bob[0].serial);

    container.end_session("alice");
    container.end_session("bob");
}

#[test]
fn concurrent_lazy_materialization_happens_once() {
    struct Heavy;

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    let mut bindings = BindingSet::new();
    bindings.add_singleton_factory::<Heavy, _>(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        Heavy
    });

    let container = bindings.build();
    let lazy = Arc::new(container.get_lazy::<Heavy>());
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let lazy = lazy.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                lazy.get().unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<Heavy>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &instances[0]));
    }
}

#[test]
fn failed_construction_is_retried_by_the_next_caller() {
    #[derive(Debug)]
    struct FirstCallFails;
    impl std::fmt::Display for FirstCallFails {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "first call fails")
        }
    }
    impl std::error::Error for FirstCallFails {}

    struct Fragile;

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let mut bindings = BindingSet::new();
    bindings.bind::<Fragile>().to_try_factory(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(FirstCallFails)
        } else {
            Ok(Fragile)
        }
    });

    let container = bindings.build();

    assert!(container.get::<Fragile>().is_err());

    // The binding reverted to uncreated; concurrent callers now race
    // into exactly one successful construction.
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.get::<Fragile>().unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<Fragile>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &instances[0]));
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
