//! # bindery
//!
//! A dependency resolution and scope-lifecycle engine for Rust.
//!
//! `bindery` resolves, constructs, caches, and wires object graphs
//! according to declared lifecycle scopes. Bindings are registered in a
//! [`BindingSet`] and frozen into an immutable, thread-safe
//! [`Container`]; resolution runs entirely on caller threads with
//! per-binding locking, explicit cycle detection, and scope-aware
//! caching.
//!
//! ## Features
//!
//! - **Five lifecycle scopes**: singleton, prototype, application,
//!   session, and request ([`ScopeKind`])
//! - **Exactly-once construction** for container-cached bindings under
//!   concurrency, with no global lock
//! - **Cycle detection** with the full ordered path in the error, and
//!   lazy handles ([`Lazy`], [`Handle`]) as the documented escape hatch
//!   for deliberate cycles
//! - **Interface disambiguation**: primary/priority/profile metadata
//!   picks the best of several implementations, and any unresolved tie
//!   is an explicit [`Ambiguous`](ResolveError::Ambiguous) error
//! - **Keyed scope stores** with explicit `begin`/`end` lifecycle and
//!   LIFO teardown hooks, sync ([`Dispose`]) and async
//!   ([`AsyncDispose`])
//! - **Narrow seams** for everything the engine does not do itself:
//!   metadata sources ([`ScopeMetadataProvider`]), profile activation
//!   ([`ProfileFilter`]), external named directories ([`NamedFallback`]),
//!   and instance decoration ([`InstanceDecorator`])
//!
//! ## Quick start
//!
//! ```rust
//! use bindery::{BindingSet, Resolver, ScopeKind};
//! use std::sync::Arc;
//!
//! struct Config {
//!     url: String,
//! }
//!
//! struct Repository {
//!     config: Arc<Config>,
//! }
//!
//! let mut bindings = BindingSet::new();
//! bindings.add_instance(Config {
//!     url: "postgres://localhost".to_string(),
//! });
//! bindings.add_singleton_factory::<Repository, _>(|ctx| Repository {
//!     config: ctx.get_required::<Config>(),
//! });
//!
//! let container = bindings.build();
//!
//! let a = container.get::<Repository>().unwrap();
//! let b = container.get::<Repository>().unwrap();
//! assert!(Arc::ptr_eq(&a, &b)); // singleton: same instance
//! assert_eq!(a.config.url, "postgres://localhost");
//! ```
//!
//! ## Scoped resolution
//!
//! Session and request bindings are cached per external scope key and
//! require an explicitly bracketed scope:
//!
//! ```rust
//! use bindery::{BindingSet, Resolver, ScopeKind};
//!
//! struct Cart {
//!     items: Vec<String>,
//! }
//!
//! let mut bindings = BindingSet::new();
//! bindings
//!     .bind::<Cart>()
//!     .scope(ScopeKind::Session)
//!     .to_factory(|_| Cart { items: Vec::new() });
//!
//! let container = bindings.build();
//! container.begin_session("alice");
//!
//! let alice = container.scoped().session("alice");
//! let cart = alice.get::<Cart>().unwrap();
//! assert!(cart.items.is_empty());
//!
//! container.end_session("alice"); // evicts and runs teardown hooks
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binding;
mod collection;
mod decoration;
mod error;
mod fallback;
mod internal;
mod key;
mod lazy;
mod metadata;
mod provider;
mod scope;
mod traits;

pub use binding::AnyArc;
pub use collection::{BindingBuilder, BindingSet};
pub use decoration::InstanceDecorator;
pub use error::{ResolveError, ResolveResult};
pub use fallback::NamedFallback;
pub use internal::BoxFutureUnit;
pub use key::{interface_key_of, key_of, named_key_of, Key};
pub use lazy::{Handle, Lazy};
pub use metadata::{
    ActiveProfiles, BindingMetadata, DefaultMetadataProvider, ProfileFilter,
    ScopeMetadataProvider,
};
pub use provider::{Container, ResolverContext, ScopedResolver};
pub use scope::ScopeKind;
pub use traits::{AsyncDispose, Dispose, Resolver, ResolverCore};
