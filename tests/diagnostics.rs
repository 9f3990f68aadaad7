#![cfg(feature = "diagnostics")]

use bindery::{BindingSet, Resolver};

#[test]
fn is_created_tracks_the_singleton_lifecycle() {
    struct Pool;

    let mut bindings = BindingSet::new();
    bindings.add_singleton_factory::<Pool, _>(|_| Pool);

    let container = bindings.build();
    assert!(!container.is_created::<Pool>());

    container.get::<Pool>().unwrap();
    assert!(container.is_created::<Pool>());

    container.reset::<Pool>();
    assert!(!container.is_created::<Pool>());
}

#[test]
fn is_created_is_false_for_unregistered_types() {
    let container = BindingSet::new().build();
    assert!(!container.is_created::<String>());
}

#[test]
fn instance_bindings_start_created() {
    let mut bindings = BindingSet::new();
    bindings.add_instance(7u32);

    let container = bindings.build();
    assert!(container.is_created::<u32>());
}
