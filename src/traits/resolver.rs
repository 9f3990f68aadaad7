//! Resolver traits for binding resolution.

use std::sync::Arc;

use crate::binding::AnyArc;
use crate::error::{ResolveError, ResolveResult};
use crate::internal::BoxFutureUnit;
use crate::key::{interface_key_of, key_of, named_key_of, Key};
use crate::lazy::{Handle, Lazy};
use crate::metadata::BindingMetadata;
use crate::provider::ScopedResolver;
use crate::traits::{AsyncDispose, Dispose};

/// Core resolver trait for object-safe binding resolution.
///
/// This trait carries the low-level, type-erased resolution mechanics:
/// key lookup, cycle detection through the per-call resolution chain, and
/// teardown hook registration. Most users should use the [`Resolver`]
/// trait instead, which layers ergonomic generic methods on top.
///
/// Deliberately not `Send + Sync`: the context handed to factories
/// threads a per-call resolution chain that must stay on the calling
/// thread.
pub trait ResolverCore {
    /// Resolves a single binding by key.
    ///
    /// Performs the full resolution algorithm: cycle check, scope-aware
    /// caching, construction through the registered factory, decoration.
    fn resolve_key(&self, key: &Key) -> ResolveResult<AnyArc>;

    /// Resolves the best implementation for an interface key.
    ///
    /// Runs disambiguation over the interface index: primary beats
    /// priority, highest priority wins among primaries, and without any
    /// primary exactly one profile-qualified candidate must remain.
    fn resolve_best(&self, key: &Key) -> ResolveResult<AnyArc>;

    /// Returns the effective metadata recorded for a binding at
    /// registration time.
    fn binding_metadata(&self, key: &Key) -> ResolveResult<BindingMetadata>;

    /// Returns an owned resolver detached from any borrowed call state,
    /// preserving the active scope keys. Used to back lazy handles.
    fn detached(&self) -> ScopedResolver;

    /// Registers a synchronous teardown hook with the owning scope
    /// (the container for singletons, the active scope store entry for
    /// session/request resolutions).
    fn push_sync_hook(&self, f: Box<dyn FnOnce() + Send>);

    /// Registers an asynchronous teardown hook with the owning scope.
    fn push_async_hook(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>);
}

/// High-level resolver interface with generic, type-safe methods.
///
/// Implemented by [`Container`](crate::Container), by
/// [`ScopedResolver`](crate::ScopedResolver), and by the
/// [`ResolverContext`](crate::ResolverContext) handed to factories, so
/// the same resolution calls work at the top level and inside
/// construction.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Resolver};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Repo { config: Arc<Config> }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_singleton_factory::<Config, _>(|_| Config {
///     url: "postgres://localhost".into(),
/// });
/// bindings.add_singleton_factory::<Repo, _>(|ctx| Repo {
///     config: ctx.get_required::<Config>(),
/// });
///
/// let container = bindings.build();
/// let repo = container.get::<Repo>().unwrap();
/// assert_eq!(repo.config.url, "postgres://localhost");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete binding.
    ///
    /// Returns the instance wrapped in an `Arc` for thread-safe sharing.
    /// The binding must be registered under the exact type `T`.
    fn get<T: 'static + Send + Sync>(&self) -> ResolveResult<Arc<T>> {
        let any = self.resolve_key(&key_of::<T>())?;
        any.downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a concrete binding, panicking on failure.
    ///
    /// Convenience for composition roots and factories where a missing
    /// binding is a configuration bug worth failing fast on.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>().unwrap_or_else(|e| {
            panic!(
                "Failed to resolve {}: {}",
                std::any::type_name::<T>(),
                e
            )
        })
    }

    /// Resolves a named binding of a concrete type.
    ///
    /// Named bindings live in a namespace disjoint from the unnamed one:
    /// the same type may carry a default binding and several named ones.
    fn get_named<T: 'static + Send + Sync>(&self, name: &'static str) -> ResolveResult<Arc<T>> {
        let any = self.resolve_key(&named_key_of::<T>(name))?;
        any.downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a named binding, panicking on failure.
    fn get_named_required<T: 'static + Send + Sync>(&self, name: &'static str) -> Arc<T> {
        self.get_named::<T>(name).unwrap_or_else(|e| {
            panic!(
                "Failed to resolve {} named '{}': {}",
                std::any::type_name::<T>(),
                name,
                e
            )
        })
    }

    /// Resolves the best implementation of an interface.
    ///
    /// Among all registered implementations, a primary one beats any
    /// non-primary regardless of priority; among primaries the highest
    /// priority wins. Without a primary, exactly one candidate matching
    /// the active profiles must remain. Any unresolved tie fails with
    /// [`ResolveError::Ambiguous`] listing the candidates.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{BindingSet, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Mailer: Send + Sync {
    ///     fn deliver(&self) -> &'static str;
    /// }
    ///
    /// struct Smtp;
    /// impl Mailer for Smtp {
    ///     fn deliver(&self) -> &'static str { "smtp" }
    /// }
    ///
    /// let mut bindings = BindingSet::new();
    /// bindings.add_singleton_factory::<Smtp, _>(|_| Smtp);
    /// bindings.add_implementation::<dyn Mailer, Smtp>(|s| s);
    ///
    /// let container = bindings.build();
    /// let mailer = container.get_interface::<dyn Mailer>().unwrap();
    /// assert_eq!(mailer.deliver(), "smtp");
    /// ```
    fn get_interface<T: ?Sized + 'static + Send + Sync>(&self) -> ResolveResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let any = self.resolve_best(&interface_key_of::<T>())?;
        // Trait objects are stored double-wrapped as Arc<Arc<T>>.
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| ResolveError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves the best interface implementation, panicking on failure.
    fn get_interface_required<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T>
    where
        Arc<T>: 'static,
    {
        self.get_interface::<T>().unwrap_or_else(|e| {
            panic!(
                "Failed to resolve interface {}: {}",
                std::any::type_name::<T>(),
                e
            )
        })
    }

    /// Returns a lazy handle for `T` without resolving anything yet.
    ///
    /// The handle materializes exactly once on first
    /// [`get`](crate::Lazy::get), under a fresh resolution chain. This is
    /// the documented mechanism for breaking otherwise-illegal cycles:
    /// a binding may hold a lazy handle to a type that eagerly depends
    /// back on it, as long as the handle is first used after
    /// construction completes.
    fn get_lazy<T: 'static + Send + Sync>(&self) -> Lazy<T> {
        Lazy::new(self.detached())
    }

    /// Returns a lazy handle for a named binding of `T`.
    fn get_lazy_named<T: 'static + Send + Sync>(&self, name: &'static str) -> Lazy<T> {
        Lazy::new_named(self.detached(), name)
    }

    /// Returns a handle for `T` honoring the binding's laziness.
    ///
    /// Bindings declared lazy yield a deferred handle and are not
    /// constructed by this call; eager bindings resolve immediately and
    /// yield a direct handle.
    fn handle_of<T: 'static + Send + Sync>(&self) -> ResolveResult<Handle<T>> {
        if self.binding_metadata(&key_of::<T>())?.lazy {
            Ok(Handle::Deferred(self.get_lazy::<T>()))
        } else {
            Ok(Handle::Direct(self.get::<T>()?))
        }
    }

    /// Registers an instance for synchronous teardown.
    ///
    /// Call from factories so the instance is cleaned up when its owning
    /// scope ends. Hooks run in LIFO order.
    fn register_disposer<T: Dispose>(&self, instance: Arc<T>) {
        self.push_sync_hook(Box::new(move || instance.dispose()));
    }

    /// Registers an instance for asynchronous teardown.
    ///
    /// Async hooks run before sync hooks when the owning scope ends
    /// through an async teardown call.
    fn register_async_disposer<T: AsyncDispose>(&self, instance: Arc<T>) {
        self.push_async_hook(Box::new(move || {
            Box::pin(async move {
                instance.dispose().await;
            })
        }));
    }
}
