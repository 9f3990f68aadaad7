//! Named-resolution fallback seam.

use std::any::TypeId;

use crate::binding::AnyArc;

/// External directory consulted when a named lookup misses.
///
/// The engine owns the named namespace; anything outside it (an external
/// registry, a parent container, a legacy bean directory) plugs in here.
/// Consulted only after the named namespace misses, never before, and
/// never for unnamed or interface lookups.
///
/// A returned instance must erase to the requested type or the caller's
/// downcast fails with a type mismatch.
///
/// # Examples
///
/// ```
/// use bindery::{AnyArc, BindingSet, NamedFallback, Resolver};
/// use std::any::TypeId;
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// struct ExternalPorts {
///     ports: HashMap<&'static str, u32>,
/// }
///
/// impl NamedFallback for ExternalPorts {
///     fn lookup(&self, type_id: TypeId, _type_name: &'static str, name: &str) -> Option<AnyArc> {
///         if type_id != TypeId::of::<u32>() {
///             return None;
///         }
///         self.ports.get(name).map(|port| Arc::new(*port) as AnyArc)
///     }
/// }
///
/// let mut bindings = BindingSet::new();
/// bindings.set_named_fallback(Arc::new(ExternalPorts {
///     ports: HashMap::from([("legacy", 2181u32)]),
/// }));
///
/// let container = bindings.build();
/// assert_eq!(*container.get_named::<u32>("legacy").unwrap(), 2181);
/// assert!(container.get_named::<u32>("unknown").is_err());
/// ```
pub trait NamedFallback: Send + Sync {
    /// Looks up an externally-held instance for `(type, name)`.
    ///
    /// `None` means the fallback does not know the name either; the
    /// original miss is then reported to the caller.
    fn lookup(&self, type_id: TypeId, type_name: &'static str, name: &str) -> Option<AnyArc>;
}
