//! Lifecycle scope definitions.

use std::fmt;

/// Lifecycle scopes controlling instance caching behavior.
///
/// Defines when a bound instance is created, whether it is cached, and
/// where the cache lives.
///
/// # Caching policy
///
/// - **Singleton / Application**: cached once in the container, shared by
///   every caller for the container's lifetime.
/// - **Prototype**: never cached; every resolution constructs a fresh
///   instance.
/// - **Session / Request**: cached per external scope key in a scope
///   store, never inside the binding itself.
///   Resolution requires an active scope bracketed by `begin_scope` /
///   `end_scope`.
///
/// # Examples
///
/// ```rust
/// use bindery::{BindingSet, Resolver, ScopeKind};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Probe { id: u32 }
///
/// let mut bindings = BindingSet::new();
///
/// // Singleton: one instance for the whole container
/// bindings.add_singleton_factory::<Config, _>(|_| Config {
///     url: "postgres://localhost".to_string(),
/// });
///
/// // Prototype: a fresh instance on every resolution
/// bindings.add_prototype_factory::<Probe, _>(|_| Probe { id: 7 });
///
/// let container = bindings.build();
///
/// let a = container.get::<Config>().unwrap();
/// let b = container.get::<Config>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b)); // same cached instance
///
/// let p1 = container.get::<Probe>().unwrap();
/// let p2 = container.get::<Probe>().unwrap();
/// assert!(!Arc::ptr_eq(&p1, &p2)); // always distinct
///
/// assert!(ScopeKind::Singleton.is_container_cached());
/// assert!(ScopeKind::Request.is_keyed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Single instance per container, created once and shared.
    Singleton,
    /// New instance per resolution, never cached.
    Prototype,
    /// Single instance per container, semantically tied to application
    /// startup/shutdown. Caching behavior is identical to `Singleton`.
    Application,
    /// One instance per session key, cached in the session `ScopeStore`.
    Session,
    /// One instance per request key, cached in the request `ScopeStore`.
    Request,
}

impl ScopeKind {
    /// Returns `true` if instances of this scope are cached in the
    /// container itself (inside the binding).
    #[inline]
    pub fn is_container_cached(&self) -> bool {
        matches!(self, ScopeKind::Singleton | ScopeKind::Application)
    }

    /// Returns `true` if instances are cached per external scope key.
    #[inline]
    pub fn is_keyed(&self) -> bool {
        matches!(self, ScopeKind::Session | ScopeKind::Request)
    }

    /// Returns `true` if metadata declaring this scope overrides an
    /// explicitly requested Singleton/Prototype scope at registration.
    #[inline]
    pub(crate) fn overrides_explicit(&self) -> bool {
        matches!(
            self,
            ScopeKind::Application | ScopeKind::Session | ScopeKind::Request
        )
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Singleton => write!(f, "singleton"),
            ScopeKind::Prototype => write!(f, "prototype"),
            ScopeKind::Application => write!(f, "application"),
            ScopeKind::Session => write!(f, "session"),
            ScopeKind::Request => write!(f, "request"),
        }
    }
}
