//! Lazy handles for deferred materialization.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::ResolveResult;
use crate::provider::ScopedResolver;
use crate::traits::Resolver;

/// Deferred-materialization handle for a binding.
///
/// Wraps a one-shot, thread-safe initializer: the first call to
/// [`get`](Lazy::get) resolves the binding exactly once; concurrent
/// callers during materialization block and then observe the cached
/// result, never a second construction. Materialization runs under a
/// fresh resolution chain, so a lazy edge breaks an otherwise-illegal
/// dependency cycle as long as the handle is first used after its
/// owner finishes constructing.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Lazy, Resolver};
///
/// struct Expensive {
///     report: String,
/// }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_singleton_factory::<Expensive, _>(|_| Expensive {
///     report: "ready".to_string(),
/// });
///
/// let container = bindings.build();
/// let lazy: Lazy<Expensive> = container.get_lazy();
/// assert!(!lazy.is_materialized());
///
/// let value = lazy.get().unwrap();
/// assert_eq!(value.report, "ready");
/// assert!(lazy.is_materialized());
/// ```
pub struct Lazy<T: 'static + Send + Sync> {
    resolver: ScopedResolver,
    name: Option<&'static str>,
    cell: OnceCell<Arc<T>>,
}

impl<T: 'static + Send + Sync> Lazy<T> {
    pub(crate) fn new(resolver: ScopedResolver) -> Self {
        Self {
            resolver,
            name: None,
            cell: OnceCell::new(),
        }
    }

    pub(crate) fn new_named(resolver: ScopedResolver, name: &'static str) -> Self {
        Self {
            resolver,
            name: Some(name),
            cell: OnceCell::new(),
        }
    }

    /// Materializes the binding on first call, then returns the cached
    /// instance.
    ///
    /// A failed materialization is not cached; a later call retries.
    pub fn get(&self) -> ResolveResult<Arc<T>> {
        self.cell
            .get_or_try_init(|| match self.name {
                Some(name) => self.resolver.get_named::<T>(name),
                None => self.resolver.get::<T>(),
            })
            .cloned()
    }

    /// Returns `true` once the wrapped binding has been materialized.
    pub fn is_materialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Handle for a binding that may or may not be lazy.
///
/// [`Resolver::handle_of`](crate::Resolver::handle_of) returns `Direct`
/// for eager bindings (already resolved) and `Deferred` for bindings
/// declared lazy (not yet constructed).
pub enum Handle<T: 'static + Send + Sync> {
    /// The binding was eager; the instance is already resolved.
    Direct(Arc<T>),
    /// The binding is lazy; the instance materializes on first use.
    Deferred(Lazy<T>),
}

impl<T: 'static + Send + Sync> Handle<T> {
    /// Returns the instance, materializing a deferred handle if needed.
    pub fn get(&self) -> ResolveResult<Arc<T>> {
        match self {
            Handle::Direct(instance) => Ok(instance.clone()),
            Handle::Deferred(lazy) => lazy.get(),
        }
    }

    /// Returns `true` if the instance exists without further work.
    pub fn is_materialized(&self) -> bool {
        match self {
            Handle::Direct(_) => true,
            Handle::Deferred(lazy) => lazy.is_materialized(),
        }
    }
}
