//! Resolution context handed to factories.

use std::cell::RefCell;

use parking_lot::Mutex;

use crate::binding::AnyArc;
use crate::error::ResolveResult;
use crate::internal::{BoxFutureUnit, HookBag, ResolutionChain};
use crate::key::Key;
use crate::metadata::BindingMetadata;
use crate::provider::{Container, ScopedResolver};
use crate::traits::{Resolver, ResolverCore};

/// Per-call resolution context.
///
/// Factories receive a `&ResolverContext` and resolve their dependencies
/// through it, which threads the top-level call's resolution chain into
/// every recursive sub-resolution. The chain is what detects cycles, so
/// dependencies must be resolved through this context rather than through
/// a captured [`Container`] clone.
///
/// The context borrows call-local state and is neither `Send` nor
/// `Sync`; it never outlives the factory invocation.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Resolver};
/// use std::sync::Arc;
///
/// struct Config { limit: usize }
/// struct Worker { config: Arc<Config> }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_instance(Config { limit: 8 });
/// bindings.add_singleton_factory::<Worker, _>(|ctx| Worker {
///     config: ctx.get_required::<Config>(),
/// });
///
/// let container = bindings.build();
/// assert_eq!(container.get::<Worker>().unwrap().config.limit, 8);
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
    chain: &'a RefCell<ResolutionChain>,
    hooks: &'a Mutex<HookBag>,
    session_key: Option<&'a str>,
    request_key: Option<&'a str>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(
        container: &'a Container,
        chain: &'a RefCell<ResolutionChain>,
        hooks: &'a Mutex<HookBag>,
        session_key: Option<&'a str>,
        request_key: Option<&'a str>,
    ) -> Self {
        Self {
            container,
            chain,
            hooks,
            session_key,
            request_key,
        }
    }

    /// Same call state with teardown hooks rebound to another bag.
    /// Used when construction happens on behalf of a keyed scope or a
    /// container-cached binding, whose hooks outlive this call.
    pub(crate) fn with_hooks<'b>(&'b self, hooks: &'b Mutex<HookBag>) -> ResolverContext<'b> {
        ResolverContext {
            container: self.container,
            chain: self.chain,
            hooks,
            session_key: self.session_key,
            request_key: self.request_key,
        }
    }

    pub(crate) fn chain_enter(&self, key: &Key) -> ResolveResult<()> {
        self.chain.borrow_mut().enter(key)
    }

    pub(crate) fn chain_exit(&self, key: &Key) {
        self.chain.borrow_mut().exit(key);
    }

    pub(crate) fn session_key(&self) -> Option<&str> {
        self.session_key
    }

    pub(crate) fn request_key(&self) -> Option<&str> {
        self.request_key
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_key(&self, key: &Key) -> ResolveResult<AnyArc> {
        self.container.resolve_in(key, self)
    }

    fn resolve_best(&self, key: &Key) -> ResolveResult<AnyArc> {
        self.container.resolve_best_in(key, self)
    }

    fn binding_metadata(&self, key: &Key) -> ResolveResult<BindingMetadata> {
        self.container.binding_metadata(key)
    }

    fn detached(&self) -> ScopedResolver {
        ScopedResolver::new(
            self.container.clone(),
            self.session_key.map(str::to_string),
            self.request_key.map(str::to_string),
        )
    }

    fn push_sync_hook(&self, f: Box<dyn FnOnce() + Send>) {
        self.hooks.lock().push_sync(f);
    }

    fn push_async_hook(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.hooks.lock().push_async(f);
    }
}

impl Resolver for ResolverContext<'_> {}
