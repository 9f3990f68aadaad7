use bindery::{AsyncDispose, BindingSet, Dispose, Resolver, ScopeKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn disposers_run_lifo_on_close() {
    struct Tracked {
        label: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Dispose for Tracked {
        fn dispose(&self) {
            self.order.lock().unwrap().push(self.label);
        }
    }

    struct First;
    struct Second;

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let first_order = order.clone();
    let second_order = order.clone();

    let mut bindings = BindingSet::new();
    bindings.add_singleton_factory::<First, _>(move |ctx| {
        ctx.register_disposer(Arc::new(Tracked {
            label: "first",
            order: first_order.clone(),
        }));
        First
    });
    bindings.add_singleton_factory::<Second, _>(move |ctx| {
        ctx.register_disposer(Arc::new(Tracked {
            label: "second",
            order: second_order.clone(),
        }));
        Second
    });

    let container = bindings.build();
    container.get::<First>().unwrap();
    container.get::<Second>().unwrap();

    container.close();
    assert_eq!(*order.lock().unwrap(), vec!["second", "first"]);
}

#[tokio::test]
async fn async_disposers_run_before_sync_on_async_close() {
    struct Flusher {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait::async_trait]
    impl AsyncDispose for Flusher {
        async fn dispose(&self) {
            self.order.lock().unwrap().push("async");
        }
    }

    struct Closer {
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Dispose for Closer {
        fn dispose(&self) {
            self.order.lock().unwrap().push("sync");
        }
    }

    struct Service;

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let hook_order = order.clone();

    let mut bindings = BindingSet::new();
    bindings.add_singleton_factory::<Service, _>(move |ctx| {
        ctx.register_disposer(Arc::new(Closer {
            order: hook_order.clone(),
        }));
        ctx.register_async_disposer(Arc::new(Flusher {
            order: hook_order.clone(),
        }));
        Service
    });

    let container = bindings.build();
    container.get::<Service>().unwrap();

    container.close_async().await;
    assert_eq!(*order.lock().unwrap(), vec!["async", "sync"]);
}

#[test]
fn scoped_disposers_run_when_their_scope_ends() {
    struct Conn {
        closed: Arc<AtomicBool>,
    }

    impl Dispose for Conn {
        fn dispose(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct RequestHandler;

    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();

    let mut bindings = BindingSet::new();
    bindings
        .bind::<RequestHandler>()
        .scope(ScopeKind::Request)
        .to_factory(move |ctx| {
            ctx.register_disposer(Arc::new(Conn {
                closed: flag.clone(),
            }));
            RequestHandler
        });

    let container = bindings.build();
    container.begin_request("req-1");
    container
        .scoped()
        .request("req-1")
        .get::<RequestHandler>()
        .unwrap();

    assert!(!closed.load(Ordering::SeqCst));
    container.end_request("req-1");
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn scope_end_async_runs_async_disposers() {
    struct Streamer {
        drained: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl AsyncDispose for Streamer {
        async fn dispose(&self) {
            self.drained.store(true, Ordering::SeqCst);
        }
    }

    struct SessionFeed;

    let drained = Arc::new(AtomicBool::new(false));
    let flag = drained.clone();

    let mut bindings = BindingSet::new();
    bindings
        .bind::<SessionFeed>()
        .scope(ScopeKind::Session)
        .to_factory(move |ctx| {
            ctx.register_async_disposer(Arc::new(Streamer {
                drained: flag.clone(),
            }));
            SessionFeed
        });

    let container = bindings.build();
    container.begin_session("alice");
    container
        .scoped()
        .session("alice")
        .get::<SessionFeed>()
        .unwrap();

    container.end_session_async("alice").await;
    assert!(drained.load(Ordering::SeqCst));
}

#[test]
fn singleton_disposers_outlive_the_scope_that_created_them() {
    struct Pool {
        closed: Arc<AtomicBool>,
    }

    impl Dispose for Pool {
        fn dispose(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct Shared;

    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();

    let mut bindings = BindingSet::new();
    // Singleton first constructed during a request-scoped resolution.
    bindings.add_singleton_factory::<Shared, _>(move |ctx| {
        ctx.register_disposer(Arc::new(Pool {
            closed: flag.clone(),
        }));
        Shared
    });

    struct Handler {
        _shared: Arc<Shared>,
    }

    bindings
        .bind::<Handler>()
        .scope(ScopeKind::Request)
        .to_factory(|ctx| Handler {
            _shared: ctx.get_required::<Shared>(),
        });

    let container = bindings.build();
    container.begin_request("req-1");
    container
        .scoped()
        .request("req-1")
        .get::<Handler>()
        .unwrap();

    // Ending the request must not tear down the singleton's resources.
    container.end_request("req-1");
    assert!(!closed.load(Ordering::SeqCst));

    container.close();
    assert!(closed.load(Ordering::SeqCst));
}
