use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use bindery::{BindingSet, Resolver, ScopeKind};
use std::sync::Arc;

fn bench_singleton_hit(c: &mut Criterion) {
    let mut bindings = BindingSet::new();
    bindings.add_instance(42u64);
    let container = bindings.build();

    // Prime the cache
    let _ = container.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = container.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut bindings = BindingSet::new();
                bindings.add_singleton_factory::<ExpensiveToCreate, _>(|_| {
                    ExpensiveToCreate {
                        data: (0..1000).collect(),
                    }
                });
                bindings.build()
            },
            |container| {
                let v = container.get::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_prototype_vs_session(c: &mut Criterion) {
    #[derive(Clone)]
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("prototype_vs_session");

    let mut proto_bindings = BindingSet::new();
    proto_bindings.add_prototype_factory::<Service, _>(|_| Service { data: [0; 64] });
    let proto_container = proto_bindings.build();

    group.bench_function("prototype", |b| {
        b.iter(|| {
            let v = proto_container.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });

    let mut session_bindings = BindingSet::new();
    session_bindings
        .bind::<Service>()
        .scope(ScopeKind::Session)
        .to_factory(|_| Service { data: [0; 64] });
    let session_container = session_bindings.build();
    session_container.begin_session("bench");
    let scoped = session_container.scoped().session("bench");

    // Prime the per-key cache
    let _ = scoped.get::<Service>().unwrap();

    group.bench_function("session_hit", |b| {
        b.iter(|| {
            let v = scoped.get::<Service>().unwrap();
            black_box(&v.data);
        })
    });

    group.finish();
    session_container.end_session("bench");
}

fn bench_interface_disambiguation(c: &mut Criterion) {
    trait Codec: Send + Sync {
        fn id(&self) -> u64;
    }

    struct Fast;
    impl Codec for Fast {
        fn id(&self) -> u64 {
            1
        }
    }

    struct Slow;
    impl Codec for Slow {
        fn id(&self) -> u64 {
            2
        }
    }

    let mut group = c.benchmark_group("interface");

    let mut single = BindingSet::new();
    single.add_singleton_factory::<Fast, _>(|_| Fast);
    single.add_implementation::<dyn Codec, Fast>(|f| f);
    let single_container = single.build();

    group.bench_function("single_candidate", |b| {
        b.iter(|| {
            let v = single_container.get_interface::<dyn Codec>().unwrap();
            black_box(v.id());
        })
    });

    let mut contested = BindingSet::new();
    contested.bind::<Fast>().primary().priority(10).to_factory(|_| Fast);
    contested.bind::<Slow>().priority(5).to_factory(|_| Slow);
    contested.add_implementation::<dyn Codec, Fast>(|f| f);
    contested.add_implementation::<dyn Codec, Slow>(|s| s);
    let contested_container = contested.build();

    group.bench_function("primary_tie_break", |b| {
        b.iter(|| {
            let v = contested_container.get_interface::<dyn Codec>().unwrap();
            black_box(v.id());
        })
    });

    group.finish();
}

fn bench_chain_depth(c: &mut Criterion) {
    // Non-cyclic chain of depth 8; measures per-frame chain overhead.
    struct Service1;
    struct Service2 {
        _s1: Arc<Service1>,
    }
    struct Service3 {
        _s2: Arc<Service2>,
    }
    struct Service4 {
        _s3: Arc<Service3>,
    }
    struct Service5 {
        _s4: Arc<Service4>,
    }
    struct Service6 {
        _s5: Arc<Service5>,
    }
    struct Service7 {
        _s6: Arc<Service6>,
    }
    struct Service8 {
        _s7: Arc<Service7>,
    }

    let mut bindings = BindingSet::new();
    bindings.add_instance(Service1);
    bindings.add_prototype_factory::<Service2, _>(|r| Service2 { _s1: r.get_required() });
    bindings.add_prototype_factory::<Service3, _>(|r| Service3 { _s2: r.get_required() });
    bindings.add_prototype_factory::<Service4, _>(|r| Service4 { _s3: r.get_required() });
    bindings.add_prototype_factory::<Service5, _>(|r| Service5 { _s4: r.get_required() });
    bindings.add_prototype_factory::<Service6, _>(|r| Service6 { _s5: r.get_required() });
    bindings.add_prototype_factory::<Service7, _>(|r| Service7 { _s6: r.get_required() });
    bindings.add_prototype_factory::<Service8, _>(|r| Service8 { _s7: r.get_required() });
    let container = bindings.build();

    c.bench_function("chain_depth_8", |b| {
        b.iter(|| {
            let service = container.get::<Service8>().unwrap();
            black_box(&service);
        })
    });
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let mut bindings = BindingSet::new();
    bindings.add_instance(42u64);
    let container = bindings.build();

    // Prime the cache
    let _ = container.get::<u64>().unwrap();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let container_ref = &container;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let v = container_ref.get::<u64>().unwrap();
                                    black_box(v);
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

fn bench_mixed_workload(c: &mut Criterion) {
    // Realistic mix: mostly singleton hits, some session hits, a few
    // prototypes.
    struct SingletonService(u64);
    struct SessionService(u64);
    struct PrototypeService(u64);

    let mut bindings = BindingSet::new();
    bindings.add_instance(SingletonService(1));
    bindings
        .bind::<SessionService>()
        .scope(ScopeKind::Session)
        .to_factory(|_| SessionService(2));
    bindings.add_prototype_factory::<PrototypeService, _>(|_| PrototypeService(3));

    let container = bindings.build();
    container.begin_session("bench");
    let scoped = container.scoped().session("bench");

    // Prime caches
    let _ = container.get::<SingletonService>().unwrap();
    let _ = scoped.get::<SessionService>().unwrap();

    c.bench_function("mixed_workload_realistic", |b| {
        b.iter(|| {
            for _ in 0..7 {
                let v = container.get::<SingletonService>().unwrap();
                black_box(v.0);
            }
            for _ in 0..2 {
                let v = scoped.get::<SessionService>().unwrap();
                black_box(v.0);
            }
            let v = container.get::<PrototypeService>().unwrap();
            black_box(v.0);
        })
    });

    container.end_session("bench");
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_prototype_vs_session,
    bench_interface_disambiguation,
    bench_chain_depth,
    bench_contention,
    bench_mixed_workload
);

criterion_main!(benches);
