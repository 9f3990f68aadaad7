//! Instance decoration seam.
//!
//! Decorators run as the very last step before any instance is handed to
//! a caller, including the cached fast path, so cross-cutting wrapping
//! stays consistent regardless of how the instance was produced.

use crate::binding::AnyArc;
use crate::key::Key;

/// Wraps resolved instances before they reach the caller.
///
/// The engine itself performs no interception; whatever proxying or
/// instrumentation layer the application uses plugs in here. A decorator
/// that does not recognize a key must return the instance unchanged.
///
/// # Examples
///
/// ```
/// use bindery::{AnyArc, BindingSet, InstanceDecorator, Key, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// struct HandOutCounter(Arc<AtomicUsize>);
///
/// impl InstanceDecorator for HandOutCounter {
///     fn decorate(&self, _key: &Key, instance: AnyArc) -> AnyArc {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         instance
///     }
/// }
///
/// let handed_out = Arc::new(AtomicUsize::new(0));
///
/// let mut bindings = BindingSet::new();
/// bindings.add_instance(42u64);
/// bindings.add_decorator(Arc::new(HandOutCounter(handed_out.clone())));
///
/// let container = bindings.build();
/// container.get::<u64>().unwrap();
/// container.get::<u64>().unwrap();
///
/// // Runs on the cached path too, once per resolution.
/// assert_eq!(handed_out.load(Ordering::Relaxed), 2);
/// ```
pub trait InstanceDecorator: Send + Sync {
    /// Decorate one resolved instance.
    ///
    /// `key` identifies the binding the instance was resolved for, so a
    /// decorator can target specific types. To replace the instance the
    /// decorator must return a value of the same erased type or later
    /// downcasts will fail with a type mismatch.
    fn decorate(&self, key: &Key, instance: AnyArc) -> AnyArc;
}
