//! Error types for the resolution engine.

use std::fmt;
use std::sync::Arc;

use crate::scope::ScopeKind;

/// Resolution errors.
///
/// Every error is surfaced to the caller as-is; the engine never retries.
/// A failed construction always reverts the binding to its uncreated
/// state, so a later call with corrected configuration may succeed.
///
/// # Examples
///
/// ```rust
/// use bindery::{BindingSet, Resolver, ResolveError};
///
/// let container = BindingSet::new().build();
/// match container.get::<String>() {
///     Err(ResolveError::Unresolved(type_name)) => {
///         assert!(type_name.contains("String"));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No binding registered for the requested type
    Unresolved(&'static str),
    /// No binding registered under the requested name, and the named
    /// fallback (if any) did not know it either
    UnresolvedNamed {
        /// Requested type
        type_name: &'static str,
        /// Requested binding name
        name: &'static str,
    },
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Cyclic dependency detected; carries the ordered path starting at
    /// the first occurrence of the repeated type, e.g. `[A, B, A]`
    Cyclic(Vec<&'static str>),
    /// More than one implementation of an interface qualified and no
    /// tie-break rule could pick a single winner
    Ambiguous {
        /// The interface being resolved
        interface: &'static str,
        /// Display names of every competing candidate
        candidates: Vec<&'static str>,
    },
    /// A session/request-scoped binding was used without an active scope
    ScopeNotActive {
        /// Scope kind of the offending binding
        scope: ScopeKind,
        /// The scope key the caller supplied, if any
        scope_key: Option<String>,
    },
    /// Factory, injector, or post-construct hook failure; wraps the cause
    Instantiation {
        /// The type that failed to construct
        type_name: &'static str,
        /// Underlying failure
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Unresolved(name) => write!(f, "No binding for: {}", name),
            ResolveError::UnresolvedNamed { type_name, name } => {
                write!(f, "No binding named '{}' for: {}", name, type_name)
            }
            ResolveError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            ResolveError::Cyclic(path) => {
                write!(f, "Cyclic dependency: {}", path.join(" -> "))
            }
            ResolveError::Ambiguous {
                interface,
                candidates,
            } => write!(
                f,
                "Ambiguous binding for {}: candidates [{}]",
                interface,
                candidates.join(", ")
            ),
            ResolveError::ScopeNotActive { scope, scope_key } => match scope_key {
                Some(key) => write!(f, "No active {} scope for key '{}'", scope, key),
                None => write!(f, "{} scope requires a scope key", scope),
            },
            ResolveError::Instantiation { type_name, source } => {
                write!(f, "Failed to construct {}: {}", type_name, source)
            }
            ResolveError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Instantiation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
