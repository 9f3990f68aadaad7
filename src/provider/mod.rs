//! Container module: the built, immutable resolution engine.
//!
//! A [`Container`] is produced by [`BindingSet::build`](crate::BindingSet::build)
//! and owns every binding, the interface index, the keyed scope stores,
//! and the container-level teardown hooks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::binding::{AnyArc, Binding};
use crate::decoration::InstanceDecorator;
use crate::error::{ResolveError, ResolveResult};
use crate::fallback::NamedFallback;
use crate::internal::{BoxFutureUnit, HookBag, ResolutionChain};
use crate::key::{key_of, named_key_of, Key};
use crate::metadata::{BindingMetadata, ProfileFilter};
use crate::scope::ScopeKind;
use crate::traits::{Resolver, ResolverCore};

pub mod context;
pub mod scoped;
mod scope_store;

pub use context::ResolverContext;
pub use scoped::ScopedResolver;

pub(crate) use scope_store::ScopeStore;

/// One qualified implementation of an interface.
///
/// Selection metadata is snapshotted from the backing concrete binding at
/// build time; `produce` resolves the concrete binding through the
/// caller's context (sharing its cache and resolution chain) and coerces
/// the result to the interface.
pub(crate) struct Candidate {
    pub(crate) impl_name: &'static str,
    pub(crate) meta: BindingMetadata,
    pub(crate) produce: CandidateFn,
}

pub(crate) type CandidateFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> ResolveResult<AnyArc> + Send + Sync>;

pub(crate) struct ProviderInner {
    pub(crate) registrations: HashMap<Key, Arc<Binding>>,
    pub(crate) interfaces: HashMap<Key, Vec<Candidate>>,
    pub(crate) profiles: Arc<dyn ProfileFilter>,
    pub(crate) decorators: Vec<Arc<dyn InstanceDecorator>>,
    pub(crate) named_fallback: Option<Arc<dyn NamedFallback>>,
    pub(crate) sessions: ScopeStore,
    pub(crate) requests: ScopeStore,
    pub(crate) root_hooks: Mutex<HookBag>,
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        let pending_hooks = !self.root_hooks.lock().is_empty();
        let open_scopes = self.sessions.active_count() + self.requests.active_count();
        if let Some(leaked) = leak_description(pending_hooks, open_scopes) {
            eprintln!(
                "bindery: container dropped with {}; call close() or close_async() before dropping",
                leaked,
            );
        }
    }
}

/// Names what was still outstanding at drop, or `None` when the
/// container was closed cleanly.
fn leak_description(pending_hooks: bool, open_scopes: usize) -> Option<String> {
    match (pending_hooks, open_scopes) {
        (false, 0) => None,
        (true, 0) => Some("pending teardown hooks".to_string()),
        (false, n) => Some(format!("{} open scope(s)", n)),
        (true, n) => Some(format!("{} open scope(s) and pending teardown hooks", n)),
    }
}

/// The built container: resolves bindings by type, name, and interface.
///
/// Cloning is cheap (`Arc` internally) and every clone shares the same
/// caches, scope stores, and teardown hooks. The container is fully
/// thread-safe; all synchronization is per binding or per scope entry,
/// never a single global lock, so unrelated resolutions do not serialize
/// each other.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_instance(Database { url: "postgres://localhost".to_string() });
/// bindings.add_prototype_factory::<UserService, _>(|ctx| UserService {
///     db: ctx.get_required::<Database>(),
/// });
///
/// let container = bindings.build();
/// let service = container.get_required::<UserService>();
/// assert_eq!(service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ProviderInner>,
}

impl Container {
    pub(crate) fn from_inner(inner: ProviderInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn root_hooks(&self) -> &Mutex<HookBag> {
        &self.inner.root_hooks
    }

    /// Returns a resolver that carries scope keys for session/request
    /// resolution.
    pub fn scoped(&self) -> ScopedResolver {
        ScopedResolver::new(self.clone(), None, None)
    }

    /// Activates a session scope key. Idempotent.
    pub fn begin_session(&self, key: impl Into<String>) {
        self.inner.sessions.begin(key);
    }

    /// Ends a session scope: evicts its cached instances and runs their
    /// teardown hooks in LIFO order.
    pub fn end_session(&self, key: &str) {
        self.inner.sessions.end(key);
    }

    /// Ends a session scope, running async teardown hooks first.
    pub async fn end_session_async(&self, key: &str) {
        self.inner.sessions.end_async(key).await;
    }

    /// Returns `true` while the session key has an active scope.
    pub fn session_active(&self, key: &str) -> bool {
        self.inner.sessions.is_active(key)
    }

    /// Activates a request scope key. Idempotent.
    pub fn begin_request(&self, key: impl Into<String>) {
        self.inner.requests.begin(key);
    }

    /// Ends a request scope: evicts its cached instances and runs their
    /// teardown hooks in LIFO order.
    pub fn end_request(&self, key: &str) {
        self.inner.requests.end(key);
    }

    /// Ends a request scope, running async teardown hooks first.
    pub async fn end_request_async(&self, key: &str) {
        self.inner.requests.end_async(key).await;
    }

    /// Returns `true` while the request key has an active scope.
    pub fn request_active(&self, key: &str) -> bool {
        self.inner.requests.is_active(key)
    }

    /// Clears the cached instance of a container-cached binding so the
    /// next resolution constructs it again. Returns `false` when no such
    /// binding exists.
    ///
    /// Intended for invalidation flows; concurrent callers racing with a
    /// reset may still receive the old instance they already resolved.
    pub fn reset<T: 'static>(&self) -> bool {
        match self.inner.registrations.get(&key_of::<T>()) {
            Some(binding) => {
                binding.reset();
                true
            }
            None => false,
        }
    }

    /// Clears the cached instance of a named container-cached binding.
    pub fn reset_named<T: 'static>(&self, name: &'static str) -> bool {
        match self.inner.registrations.get(&named_key_of::<T>(name)) {
            Some(binding) => {
                binding.reset();
                true
            }
            None => false,
        }
    }

    /// Ends all active scopes and runs container-level teardown hooks in
    /// LIFO order.
    ///
    /// Pending async hooks cannot run here; use
    /// [`close_async`](Self::close_async) when async disposers were
    /// registered.
    pub fn close(&self) {
        self.inner.requests.end_all();
        self.inner.sessions.end_all();
        let mut hooks = self.inner.root_hooks.lock();
        if hooks.has_async() {
            eprintln!(
                "bindery: container closed synchronously with pending async teardown hooks"
            );
        }
        hooks.run_sync_lifo();
    }

    /// Ends all active scopes and runs container-level teardown hooks,
    /// async hooks before sync hooks, each group in LIFO order.
    pub async fn close_async(&self) {
        self.inner.requests.end_all_async().await;
        self.inner.sessions.end_all_async().await;
        let mut bag = std::mem::take(&mut *self.inner.root_hooks.lock());
        bag.run_async_lifo().await;
        bag.run_sync_lifo();
    }

    #[cfg(feature = "diagnostics")]
    /// Returns `true` if the container-cached binding for `T` has been
    /// constructed.
    pub fn is_created<T: 'static>(&self) -> bool {
        self.inner
            .registrations
            .get(&key_of::<T>())
            .map(|binding| binding.is_created())
            .unwrap_or(false)
    }

    pub(crate) fn lookup_metadata(&self, key: &Key) -> ResolveResult<BindingMetadata> {
        self.lookup(key).map(|binding| binding.metadata.clone())
    }

    fn lookup(&self, key: &Key) -> ResolveResult<Arc<Binding>> {
        if let Some(binding) = self.inner.registrations.get(key) {
            return Ok(binding.clone());
        }
        if let Key::TypeNamed(_, type_name, name) = *key {
            return Err(ResolveError::UnresolvedNamed { type_name, name });
        }
        Err(ResolveError::Unresolved(key.display_name()))
    }

    /// Consults the external named-fallback directory for a name the
    /// named namespace does not know.
    fn lookup_named_fallback(&self, key: &Key) -> Option<AnyArc> {
        let fallback = self.inner.named_fallback.as_ref()?;
        match *key {
            Key::TypeNamed(id, type_name, name) => fallback.lookup(id, type_name, name),
            _ => None,
        }
    }

    /// Full resolution algorithm for one key within an in-flight call.
    ///
    /// Cycle check first, then scope-specific caching, decoration last on
    /// every success path including the cached one. A named miss falls
    /// through to the external fallback directory before failing; its
    /// instances are pre-built, so they skip the chain and the state
    /// machine but not decoration.
    pub(crate) fn resolve_in(
        &self,
        key: &Key,
        ctx: &ResolverContext<'_>,
    ) -> ResolveResult<AnyArc> {
        let binding = match self.lookup(key) {
            Ok(binding) => binding,
            Err(miss) => {
                return match self.lookup_named_fallback(key) {
                    Some(instance) => Ok(self.decorate(key, instance)),
                    None => Err(miss),
                };
            }
        };
        ctx.chain_enter(&binding.key)?;
        let result = self.resolve_binding(&binding, ctx);
        ctx.chain_exit(&binding.key);
        let instance = result?;
        Ok(self.decorate(&binding.key, instance))
    }

    fn resolve_binding(
        &self,
        binding: &Arc<Binding>,
        ctx: &ResolverContext<'_>,
    ) -> ResolveResult<AnyArc> {
        match binding.metadata.scope {
            ScopeKind::Singleton | ScopeKind::Application => {
                // Hooks registered during singleton construction belong
                // to the container even when the call came through a
                // keyed scope.
                let root_ctx = ctx.with_hooks(self.root_hooks());
                let (instance, created) = binding.resolve_cached(&root_ctx)?;
                if created {
                    if let Some(pre_destroy) = &binding.pre_destroy {
                        let hook_instance = instance.clone();
                        let pre_destroy = pre_destroy.clone();
                        self.inner
                            .root_hooks
                            .lock()
                            .push_sync(Box::new(move || pre_destroy(&hook_instance)));
                    }
                }
                Ok(instance)
            }
            ScopeKind::Prototype => binding.construct(ctx),
            ScopeKind::Session => {
                self.inner
                    .sessions
                    .get_or_create(ctx.session_key(), binding, ctx)
            }
            ScopeKind::Request => {
                self.inner
                    .requests
                    .get_or_create(ctx.request_key(), binding, ctx)
            }
        }
    }

    /// Interface disambiguation within an in-flight call.
    pub(crate) fn resolve_best_in(
        &self,
        key: &Key,
        ctx: &ResolverContext<'_>,
    ) -> ResolveResult<AnyArc> {
        let candidates = self
            .inner
            .interfaces
            .get(key)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| ResolveError::Unresolved(key.display_name()))?;
        let winner = self.select_best(key, candidates)?;
        ctx.chain_enter(key)?;
        let result = (winner.produce)(ctx);
        ctx.chain_exit(key);
        let instance = result?;
        Ok(self.decorate(key, instance))
    }

    /// Tie-break rule: primary beats non-primary regardless of priority;
    /// among primaries the highest priority wins; any remaining tie is an
    /// ambiguity error, never an arbitrary pick. Without a primary,
    /// exactly one profile-qualified candidate must remain.
    fn select_best<'c>(
        &self,
        key: &Key,
        candidates: &'c [Candidate],
    ) -> ResolveResult<&'c Candidate> {
        let ambiguous = || ResolveError::Ambiguous {
            interface: key.display_name(),
            candidates: candidates.iter().map(|c| c.impl_name).collect(),
        };

        let primaries: Vec<&Candidate> =
            candidates.iter().filter(|c| c.meta.primary).collect();
        if !primaries.is_empty() {
            let top = primaries
                .iter()
                .map(|c| c.meta.priority)
                .max()
                .unwrap_or(i32::MIN);
            let mut winners = primaries.iter().filter(|c| c.meta.priority == top);
            return match (winners.next(), winners.next()) {
                (Some(winner), None) => Ok(*winner),
                _ => Err(ambiguous()),
            };
        }

        let mut eligible = candidates.iter().filter(|c| match &c.meta.profile {
            None => true,
            Some(profile) => self.inner.profiles.is_active(profile),
        });
        match (eligible.next(), eligible.next()) {
            (Some(winner), None) => Ok(winner),
            _ => Err(ambiguous()),
        }
    }

    fn decorate(&self, key: &Key, instance: AnyArc) -> AnyArc {
        self.inner
            .decorators
            .iter()
            .fold(instance, |inst, decorator| decorator.decorate(key, inst))
    }
}

impl ResolverCore for Container {
    fn resolve_key(&self, key: &Key) -> ResolveResult<AnyArc> {
        let chain = RefCell::new(ResolutionChain::new());
        let ctx = ResolverContext::new(self, &chain, self.root_hooks(), None, None);
        self.resolve_in(key, &ctx)
    }

    fn resolve_best(&self, key: &Key) -> ResolveResult<AnyArc> {
        let chain = RefCell::new(ResolutionChain::new());
        let ctx = ResolverContext::new(self, &chain, self.root_hooks(), None, None);
        self.resolve_best_in(key, &ctx)
    }

    fn binding_metadata(&self, key: &Key) -> ResolveResult<BindingMetadata> {
        self.lookup_metadata(key)
    }

    fn detached(&self) -> ScopedResolver {
        ScopedResolver::new(self.clone(), None, None)
    }

    fn push_sync_hook(&self, f: Box<dyn FnOnce() + Send>) {
        self.inner.root_hooks.lock().push_sync(f);
    }

    fn push_async_hook(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.inner.root_hooks.lock().push_async(f);
    }
}

impl Resolver for Container {}
