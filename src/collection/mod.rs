//! Binding registration and container construction.
//!
//! A [`BindingSet`] collects binding registrations and configuration
//! seams, then [`build`](BindingSet::build)s the immutable
//! [`Container`]. Registration is the only time binding maps are
//! mutated; after `build` the container is read-only apart from each
//! binding's own creation state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::binding::{AnyArc, Binding, FactoryFn, PreDestroyFn};
use crate::decoration::InstanceDecorator;
use crate::error::{ResolveError, ResolveResult};
use crate::fallback::NamedFallback;
use crate::internal::HookBag;
use crate::key::{interface_key_of, key_of, named_key_of, Key};
use crate::metadata::{
    ActiveProfiles, BindingMetadata, DefaultMetadataProvider, ProfileFilter, ScopeClassifier,
    ScopeMetadataProvider,
};
use crate::provider::{Candidate, CandidateFn, Container, ProviderInner, ResolverContext};
use crate::provider::ScopeStore;
use crate::scope::ScopeKind;
use crate::traits::ResolverCore;

type InjectorFn<T> =
    Box<dyn for<'a> Fn(&mut T, &ResolverContext<'a>) -> ResolveResult<()> + Send + Sync>;

/// Explicitly requested metadata, distinct from the values the
/// [`ScopeMetadataProvider`] declares. Merged at build time: the
/// explicit scope wins for Singleton/Prototype, but a declared
/// Application/Session/Request scope always takes precedence.
#[derive(Default)]
struct ExplicitMetadata {
    scope: Option<ScopeKind>,
    lazy: Option<bool>,
    priority: Option<i32>,
    primary: Option<bool>,
    profile: Option<String>,
}

struct PendingBinding {
    key: Key,
    explicit: ExplicitMetadata,
    ctor: FactoryFn,
    pre_destroy: Option<PreDestroyFn>,
    seed: Option<AnyArc>,
}

struct PendingCandidate {
    interface: Key,
    concrete: Option<Key>,
    impl_name: &'static str,
    produce: CandidateFn,
    meta: Option<BindingMetadata>,
}

/// Mutable set of binding registrations.
///
/// Registration is idempotent per key: the first registration wins and
/// later ones for the same key are ignored. Named bindings live in a
/// namespace disjoint from unnamed ones, so one type may carry a default
/// binding and any number of named ones.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Resolver, ScopeKind};
/// use std::sync::Arc;
///
/// struct Config { retries: u32 }
/// struct Client { config: Arc<Config> }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_instance(Config { retries: 3 });
/// bindings
///     .bind::<Client>()
///     .scope(ScopeKind::Prototype)
///     .to_factory(|ctx| Client {
///         config: ctx.get_required::<Config>(),
///     });
///
/// let container = bindings.build();
/// assert_eq!(container.get::<Client>().unwrap().config.retries, 3);
/// ```
pub struct BindingSet {
    pending: Vec<PendingBinding>,
    registered: HashSet<Key>,
    candidates: Vec<PendingCandidate>,
    metadata_provider: Arc<dyn ScopeMetadataProvider>,
    profile_filter: Arc<dyn ProfileFilter>,
    decorators: Vec<Arc<dyn InstanceDecorator>>,
    named_fallback: Option<Arc<dyn NamedFallback>>,
}

impl BindingSet {
    /// Creates an empty binding set with default configuration: every
    /// binding classifies as an eager singleton, no profiles are active,
    /// and named lookups do not fall back to unnamed bindings.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            registered: HashSet::new(),
            candidates: Vec::new(),
            metadata_provider: Arc::new(DefaultMetadataProvider),
            profile_filter: Arc::new(ActiveProfiles::new()),
            decorators: Vec::new(),
            named_fallback: None,
        }
    }

    /// Starts a typed binding registration.
    ///
    /// The builder declares scope, laziness, disambiguation metadata,
    /// injection and lifecycle hooks, and finishes with one of
    /// [`to_factory`](BindingBuilder::to_factory),
    /// [`to_try_factory`](BindingBuilder::to_try_factory), or
    /// [`to_instance`](BindingBuilder::to_instance).
    pub fn bind<T: 'static + Send + Sync>(&mut self) -> BindingBuilder<'_, T> {
        BindingBuilder {
            set: self,
            name: None,
            explicit: ExplicitMetadata::default(),
            injectors: Vec::new(),
            post_construct: None,
            pre_destroy: None,
        }
    }

    /// Registers a pre-built instance as a singleton.
    ///
    /// The binding starts in the created state; the resolution algorithm
    /// never constructs it.
    pub fn add_instance<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.bind::<T>().to_instance(value);
        self
    }

    /// Registers a pre-built instance under a name.
    pub fn add_named_instance<T: 'static + Send + Sync>(
        &mut self,
        name: &'static str,
        value: T,
    ) -> &mut Self {
        self.bind::<T>().named(name).to_instance(value);
        self
    }

    /// Registers a singleton factory.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().to_factory(factory);
        self
    }

    /// Registers a named singleton factory.
    pub fn add_named_singleton_factory<T, F>(
        &mut self,
        name: &'static str,
        factory: F,
    ) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().named(name).to_factory(factory);
        self
    }

    /// Registers a prototype factory: a fresh instance per resolution,
    /// never cached.
    pub fn add_prototype_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().scope(ScopeKind::Prototype).to_factory(factory);
        self
    }

    /// Registers a session-scoped factory: one instance per session key.
    pub fn add_session_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().scope(ScopeKind::Session).to_factory(factory);
        self
    }

    /// Registers a request-scoped factory: one instance per request key.
    pub fn add_request_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: for<'a> Fn(&ResolverContext<'a>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().scope(ScopeKind::Request).to_factory(factory);
        self
    }

    /// Registers a concrete binding as an implementation of an
    /// interface, for best-implementation selection.
    ///
    /// `T` must also carry its own binding; resolution of the interface
    /// goes through it, sharing its scope and cache. Disambiguation
    /// metadata (primary, priority, profile) is read from that binding,
    /// so declare it where `T` is bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{BindingSet, Resolver};
    ///
    /// trait Store: Send + Sync {
    ///     fn kind(&self) -> &'static str;
    /// }
    ///
    /// struct DiskStore;
    /// impl Store for DiskStore {
    ///     fn kind(&self) -> &'static str { "disk" }
    /// }
    ///
    /// struct MemStore;
    /// impl Store for MemStore {
    ///     fn kind(&self) -> &'static str { "mem" }
    /// }
    ///
    /// let mut bindings = BindingSet::new();
    /// bindings.add_singleton_factory::<DiskStore, _>(|_| DiskStore);
    /// bindings.bind::<MemStore>().primary().to_factory(|_| MemStore);
    /// bindings.add_implementation::<dyn Store, DiskStore>(|s| s);
    /// bindings.add_implementation::<dyn Store, MemStore>(|s| s);
    ///
    /// let container = bindings.build();
    /// let store = container.get_interface::<dyn Store>().unwrap();
    /// assert_eq!(store.kind(), "mem"); // primary wins
    /// ```
    pub fn add_implementation<I, T>(&mut self, coerce: fn(Arc<T>) -> Arc<I>) -> &mut Self
    where
        I: ?Sized + 'static + Send + Sync,
        T: 'static + Send + Sync,
    {
        let produce: CandidateFn = Arc::new(move |ctx| {
            let any = ctx.resolve_key(&key_of::<T>())?;
            let value = any
                .downcast::<T>()
                .map_err(|_| ResolveError::TypeMismatch(std::any::type_name::<T>()))?;
            let iface: Arc<I> = coerce(value);
            Ok(Arc::new(iface) as AnyArc)
        });
        self.candidates.push(PendingCandidate {
            interface: interface_key_of::<I>(),
            concrete: Some(key_of::<T>()),
            impl_name: std::any::type_name::<T>(),
            produce,
            meta: None,
        });
        self
    }

    /// Registers a ready-made trait object as an interface candidate
    /// with default metadata.
    pub fn add_interface_instance<I: ?Sized + 'static + Send + Sync>(
        &mut self,
        instance: Arc<I>,
    ) -> &mut Self {
        let stored: AnyArc = Arc::new(instance);
        let produce: CandidateFn = Arc::new(move |_| Ok(stored.clone()));
        self.candidates.push(PendingCandidate {
            interface: interface_key_of::<I>(),
            concrete: None,
            impl_name: std::any::type_name::<I>(),
            produce,
            meta: Some(BindingMetadata::default()),
        });
        self
    }

    /// Replaces the metadata provider consulted at build time for every
    /// registered key.
    pub fn set_metadata_provider(
        &mut self,
        provider: Arc<dyn ScopeMetadataProvider>,
    ) -> &mut Self {
        self.metadata_provider = provider;
        self
    }

    /// Replaces the profile filter used during interface disambiguation.
    pub fn set_profile_filter(&mut self, filter: Arc<dyn ProfileFilter>) -> &mut Self {
        self.profile_filter = filter;
        self
    }

    /// Convenience for the common case: an explicit active-profile set.
    pub fn set_active_profiles(&mut self, profiles: ActiveProfiles) -> &mut Self {
        self.profile_filter = Arc::new(profiles);
        self
    }

    /// Adds an instance decorator, applied to every resolved instance in
    /// registration order, cached fast path included.
    pub fn add_decorator(&mut self, decorator: Arc<dyn InstanceDecorator>) -> &mut Self {
        self.decorators.push(decorator);
        self
    }

    /// Installs an external directory consulted when a named lookup
    /// misses the named namespace. Registered named bindings always win;
    /// the fallback is asked only after the miss.
    pub fn set_named_fallback(&mut self, fallback: Arc<dyn NamedFallback>) -> &mut Self {
        self.named_fallback = Some(fallback);
        self
    }

    fn push_pending(
        &mut self,
        key: Key,
        explicit: ExplicitMetadata,
        ctor: FactoryFn,
        pre_destroy: Option<PreDestroyFn>,
        seed: Option<AnyArc>,
    ) {
        // First registration wins.
        if !self.registered.insert(key.clone()) {
            return;
        }
        self.pending.push(PendingBinding {
            key,
            explicit,
            ctor,
            pre_destroy,
            seed,
        });
    }

    /// Builds the container.
    ///
    /// Classifies every registered key through the metadata provider,
    /// merges in the explicitly requested metadata, snapshots interface
    /// candidate metadata from the backing bindings, and freezes the
    /// whole set into an immutable [`Container`].
    pub fn build(self) -> Container {
        let classifier = ScopeClassifier::new(self.metadata_provider);
        let mut registrations = HashMap::with_capacity(self.pending.len());
        for pending in self.pending {
            let declared = classifier.classify(&pending.key);
            let meta = merge_metadata(declared, &pending.explicit);
            let binding = match pending.seed {
                Some(seed) => Binding::preseeded(pending.key.clone(), meta, pending.ctor, seed),
                None => Binding::new(pending.key.clone(), meta, pending.ctor, pending.pre_destroy),
            };
            registrations.insert(pending.key, Arc::new(binding));
        }

        let mut interfaces: HashMap<Key, Vec<Candidate>> = HashMap::new();
        for candidate in self.candidates {
            let meta = match candidate.meta {
                Some(meta) => meta,
                None => candidate
                    .concrete
                    .as_ref()
                    .and_then(|key| registrations.get(key))
                    .map(|binding| binding.metadata.clone())
                    .unwrap_or_default(),
            };
            interfaces.entry(candidate.interface).or_default().push(Candidate {
                impl_name: candidate.impl_name,
                meta,
                produce: candidate.produce,
            });
        }

        Container::from_inner(ProviderInner {
            registrations,
            interfaces,
            profiles: self.profile_filter,
            decorators: self.decorators,
            named_fallback: self.named_fallback,
            sessions: ScopeStore::new(ScopeKind::Session),
            requests: ScopeStore::new(ScopeKind::Request),
            root_hooks: Mutex::new(HookBag::default()),
        })
    }
}

impl Default for BindingSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Declared Application/Session/Request scopes always take precedence
/// over the explicitly requested scope; everything else the explicit
/// request overrides.
fn merge_metadata(declared: BindingMetadata, explicit: &ExplicitMetadata) -> BindingMetadata {
    let mut meta = declared;
    if let Some(scope) = explicit.scope {
        if !meta.scope.overrides_explicit() {
            meta.scope = scope;
        }
    }
    if let Some(lazy) = explicit.lazy {
        meta.lazy = lazy;
    }
    if let Some(priority) = explicit.priority {
        meta.priority = priority;
    }
    if let Some(primary) = explicit.primary {
        meta.primary = primary;
    }
    if explicit.profile.is_some() {
        meta.profile = explicit.profile.clone();
    }
    meta
}

/// Typed registration builder returned by [`BindingSet::bind`].
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Resolver, ScopeKind};
///
/// struct AuditLog {
///     sink: String,
/// }
///
/// let mut bindings = BindingSet::new();
/// bindings
///     .bind::<AuditLog>()
///     .scope(ScopeKind::Application)
///     .post_construct(|log| {
///         assert!(!log.sink.is_empty());
///         Ok(())
///     })
///     .to_factory(|_| AuditLog { sink: "stdout".into() });
///
/// let container = bindings.build();
/// assert_eq!(container.get::<AuditLog>().unwrap().sink, "stdout");
/// ```
pub struct BindingBuilder<'s, T: 'static + Send + Sync> {
    set: &'s mut BindingSet,
    name: Option<&'static str>,
    explicit: ExplicitMetadata,
    injectors: Vec<InjectorFn<T>>,
    post_construct: Option<Box<dyn Fn(&T) -> ResolveResult<()> + Send + Sync>>,
    pre_destroy: Option<Box<dyn Fn(&T) + Send + Sync>>,
}

impl<'s, T: 'static + Send + Sync> BindingBuilder<'s, T> {
    /// Requests an explicit scope.
    ///
    /// A provider-declared Application/Session/Request scope overrides
    /// this request at build time.
    pub fn scope(mut self, scope: ScopeKind) -> Self {
        self.explicit.scope = Some(scope);
        self
    }

    /// Marks the binding lazy: [`handle_of`](crate::Resolver::handle_of)
    /// returns a deferred handle and eager cycle detection is bypassed
    /// until first materialization.
    pub fn lazy(mut self) -> Self {
        self.explicit.lazy = Some(true);
        self
    }

    /// Sets the disambiguation priority among interface candidates.
    pub fn priority(mut self, priority: i32) -> Self {
        self.explicit.priority = Some(priority);
        self
    }

    /// Flags this binding primary among interface candidates: it beats
    /// any non-primary candidate regardless of priority.
    pub fn primary(mut self) -> Self {
        self.explicit.primary = Some(true);
        self
    }

    /// Tags the binding with an alternative profile. As an interface
    /// candidate it only qualifies while the profile is active.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.explicit.profile = Some(profile.into());
        self
    }

    /// Registers under a name, in the named namespace.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Adds a member injector, run after construction and before the
    /// post-construct hook, while the instance is still exclusively
    /// owned.
    pub fn inject<F>(mut self, injector: F) -> Self
    where
        F: for<'a> Fn(&mut T, &ResolverContext<'a>) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.injectors.push(Box::new(injector));
        self
    }

    /// Adds a post-construct hook. A failing hook aborts the resolution
    /// and reverts the binding to uncreated.
    pub fn post_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.post_construct = Some(Box::new(hook));
        self
    }

    /// Adds a pre-destroy hook, run when the owning scope ends (the
    /// container for singletons, the keyed scope for session/request
    /// bindings). Prototype instances are never tracked, so the hook
    /// does not apply to them.
    pub fn pre_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.pre_destroy = Some(Box::new(hook));
        self
    }

    /// Finishes the registration with an infallible factory.
    pub fn to_factory<F>(self, factory: F) -> &'s mut BindingSet
    where
        F: for<'a> Fn(&ResolverContext<'a>) -> T + Send + Sync + 'static,
    {
        self.finish(move |ctx| Ok(factory(ctx)))
    }

    /// Finishes the registration with a fallible factory. The error is
    /// wrapped in [`ResolveError::Instantiation`] and the binding
    /// reverts to uncreated so a later call may retry.
    pub fn to_try_factory<F, E>(self, factory: F) -> &'s mut BindingSet
    where
        F: for<'a> Fn(&ResolverContext<'a>) -> Result<T, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.finish(move |ctx| {
            factory(ctx).map_err(|e| ResolveError::Instantiation {
                type_name: std::any::type_name::<T>(),
                source: Arc::new(e),
            })
        })
    }

    /// Finishes the registration with a pre-built instance. Injectors
    /// and lifecycle hooks declared on the builder do not apply; the
    /// instance is stored as-is in the created state.
    pub fn to_instance(self, value: T) -> &'s mut BindingSet {
        let key = self.key();
        let seed: AnyArc = Arc::new(value);
        let ctor_seed = seed.clone();
        let ctor: FactoryFn = Arc::new(move |_| Ok(ctor_seed.clone()));
        self.set
            .push_pending(key, self.explicit, ctor, None, Some(seed));
        self.set
    }

    fn key(&self) -> Key {
        match self.name {
            Some(name) => named_key_of::<T>(name),
            None => key_of::<T>(),
        }
    }

    fn finish<F>(self, construct: F) -> &'s mut BindingSet
    where
        F: for<'a> Fn(&ResolverContext<'a>) -> ResolveResult<T> + Send + Sync + 'static,
    {
        let key = self.key();
        let injectors = self.injectors;
        let post_construct = self.post_construct;
        let ctor: FactoryFn = Arc::new(move |ctx| {
            let mut value = construct(ctx)?;
            for injector in &injectors {
                injector(&mut value, ctx)?;
            }
            if let Some(hook) = &post_construct {
                hook(&value)?;
            }
            Ok(Arc::new(value) as AnyArc)
        });
        let pre_destroy = self.pre_destroy.map(|hook| {
            let erased: PreDestroyFn = Arc::new(move |any: &AnyArc| {
                if let Some(value) = any.downcast_ref::<T>() {
                    hook(value);
                }
            });
            erased
        });
        self.set.push_pending(key, self.explicit, ctor, pre_destroy, None);
        self.set
    }
}
