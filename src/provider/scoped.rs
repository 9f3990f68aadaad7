//! Scope-key-aware resolver.

use std::cell::RefCell;

use parking_lot::Mutex;

use crate::binding::AnyArc;
use crate::error::ResolveResult;
use crate::internal::{BoxFutureUnit, HookBag, ResolutionChain};
use crate::key::Key;
use crate::metadata::BindingMetadata;
use crate::provider::{Container, ResolverContext};
use crate::traits::{Resolver, ResolverCore};

/// Resolver carrying the active session/request keys.
///
/// Session and request bindings are cached per external scope key, so the
/// key must travel with every resolution that may reach one. Build a
/// `ScopedResolver` from a [`Container`] and use it like the container
/// itself; singleton and prototype bindings behave identically through
/// either.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Resolver, ScopeKind};
/// use std::sync::Arc;
///
/// struct Basket { items: Vec<String> }
///
/// let mut bindings = BindingSet::new();
/// bindings
///     .bind::<Basket>()
///     .scope(ScopeKind::Session)
///     .to_factory(|_| Basket { items: Vec::new() });
///
/// let container = bindings.build();
/// container.begin_session("alice");
///
/// let alice = container.scoped().session("alice");
/// let a = alice.get::<Basket>().unwrap();
/// let b = alice.get::<Basket>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b)); // cached per session key
///
/// container.end_session("alice");
/// ```
#[derive(Clone)]
pub struct ScopedResolver {
    container: Container,
    session_key: Option<String>,
    request_key: Option<String>,
}

impl ScopedResolver {
    pub(crate) fn new(
        container: Container,
        session_key: Option<String>,
        request_key: Option<String>,
    ) -> Self {
        Self {
            container,
            session_key,
            request_key,
        }
    }

    /// Sets the session key for subsequent resolutions.
    pub fn session(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    /// Sets the request key for subsequent resolutions.
    pub fn request(mut self, key: impl Into<String>) -> Self {
        self.request_key = Some(key.into());
        self
    }

    /// The container this resolver resolves through.
    pub fn container(&self) -> &Container {
        &self.container
    }

    // Every top-level call gets its own chain; the scope keys are the
    // only state that survives between calls.
    fn with_fresh_call<R>(
        &self,
        f: impl FnOnce(&ResolverContext<'_>) -> ResolveResult<R>,
    ) -> ResolveResult<R> {
        let chain = RefCell::new(ResolutionChain::new());
        let hooks: &Mutex<HookBag> = self.container.root_hooks();
        let ctx = ResolverContext::new(
            &self.container,
            &chain,
            hooks,
            self.session_key.as_deref(),
            self.request_key.as_deref(),
        );
        f(&ctx)
    }
}

impl ResolverCore for ScopedResolver {
    fn resolve_key(&self, key: &Key) -> ResolveResult<AnyArc> {
        self.with_fresh_call(|ctx| self.container.resolve_in(key, ctx))
    }

    fn resolve_best(&self, key: &Key) -> ResolveResult<AnyArc> {
        self.with_fresh_call(|ctx| self.container.resolve_best_in(key, ctx))
    }

    fn binding_metadata(&self, key: &Key) -> ResolveResult<BindingMetadata> {
        self.container.lookup_metadata(key)
    }

    fn detached(&self) -> ScopedResolver {
        self.clone()
    }

    fn push_sync_hook(&self, f: Box<dyn FnOnce() + Send>) {
        self.container.root_hooks().lock().push_sync(f);
    }

    fn push_async_hook(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.container.root_hooks().lock().push_async(f);
    }
}

impl Resolver for ScopedResolver {}
