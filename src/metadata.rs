//! Binding metadata and the classification seam.
//!
//! The engine never reads annotations, config files, or attributes itself.
//! Whatever mechanism declares a type's scope and disambiguation data is
//! hidden behind [`ScopeMetadataProvider`]; the [`ScopeClassifier`] memoizes
//! its answers per key.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::key::Key;
use crate::scope::ScopeKind;

/// Declared lifecycle and disambiguation metadata for one binding.
#[derive(Debug, Clone)]
pub struct BindingMetadata {
    /// Lifecycle scope
    pub scope: ScopeKind,
    /// Lazy bindings are resolved through deferred handles and skip eager
    /// cycle detection
    pub lazy: bool,
    /// Numeric priority among competing interface implementations;
    /// higher wins among primaries
    pub priority: i32,
    /// Primary implementations beat non-primary ones regardless of priority
    pub primary: bool,
    /// Alternative-profile tag; the implementation only qualifies when the
    /// profile is active (or when it carries no tag)
    pub profile: Option<String>,
}

impl Default for BindingMetadata {
    fn default() -> Self {
        Self {
            scope: ScopeKind::Singleton,
            lazy: false,
            priority: 0,
            primary: false,
            profile: None,
        }
    }
}

/// Source of declared binding metadata.
///
/// Implemented by whatever configuration mechanism the application uses:
/// builder calls, generated tables, config files. The engine only depends
/// on this contract.
///
/// # Examples
///
/// ```rust
/// use bindery::{BindingMetadata, Key, ScopeKind, ScopeMetadataProvider};
///
/// struct SessionForUserState;
///
/// impl ScopeMetadataProvider for SessionForUserState {
///     fn classify(&self, key: &Key) -> BindingMetadata {
///         let mut meta = BindingMetadata::default();
///         if key.display_name().ends_with("UserState") {
///             meta.scope = ScopeKind::Session;
///         }
///         meta
///     }
/// }
/// ```
pub trait ScopeMetadataProvider: Send + Sync {
    /// Classify one key. Called once per key; the result is memoized.
    fn classify(&self, key: &Key) -> BindingMetadata;
}

/// Default provider: every binding is an eager singleton with no
/// disambiguation metadata.
pub struct DefaultMetadataProvider;

impl ScopeMetadataProvider for DefaultMetadataProvider {
    fn classify(&self, _key: &Key) -> BindingMetadata {
        BindingMetadata::default()
    }
}

/// Decides whether an alternative profile is active.
///
/// Consulted only during interface disambiguation, never on the plain
/// resolution path.
pub trait ProfileFilter: Send + Sync {
    /// Returns `true` if the given profile tag is currently active.
    fn is_active(&self, profile: &str) -> bool;
}

/// Explicit active-profile set, the default [`ProfileFilter`].
///
/// # Examples
///
/// ```rust
/// use bindery::{ActiveProfiles, ProfileFilter};
///
/// let profiles = ActiveProfiles::from_iter(["test", "in-memory"]);
/// assert!(profiles.is_active("test"));
/// assert!(!profiles.is_active("production"));
/// ```
#[derive(Default)]
pub struct ActiveProfiles {
    profiles: HashSet<String>,
}

impl ActiveProfiles {
    /// Creates an empty set; no tagged alternative qualifies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from the given profile names.
    pub fn from_iter<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profiles: profiles.into_iter().map(Into::into).collect(),
        }
    }

    /// Activates one more profile.
    pub fn activate(&mut self, profile: impl Into<String>) {
        self.profiles.insert(profile.into());
    }
}

impl ProfileFilter for ActiveProfiles {
    fn is_active(&self, profile: &str) -> bool {
        self.profiles.contains(profile)
    }
}

/// Memoizing wrapper around a [`ScopeMetadataProvider`].
///
/// Providers may be arbitrarily expensive; classification for a given key
/// is answered from the memo map after the first call.
pub(crate) struct ScopeClassifier {
    provider: Arc<dyn ScopeMetadataProvider>,
    memo: RwLock<HashMap<Key, BindingMetadata>>,
}

impl ScopeClassifier {
    pub(crate) fn new(provider: Arc<dyn ScopeMetadataProvider>) -> Self {
        Self {
            provider,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn classify(&self, key: &Key) -> BindingMetadata {
        if let Some(meta) = self.memo.read().get(key) {
            return meta.clone();
        }
        let meta = self.provider.classify(key);
        self.memo
            .write()
            .entry(key.clone())
            .or_insert(meta)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn classifier_memoizes_provider_answers() {
        struct Counting(AtomicUsize);
        impl ScopeMetadataProvider for Counting {
            fn classify(&self, _key: &Key) -> BindingMetadata {
                self.0.fetch_add(1, Ordering::SeqCst);
                BindingMetadata::default()
            }
        }

        let provider = Arc::new(Counting(AtomicUsize::new(0)));
        let classifier = ScopeClassifier::new(provider.clone());
        let key = key_of::<String>();

        classifier.classify(&key);
        classifier.classify(&key);
        classifier.classify(&key);

        assert_eq!(provider.0.load(Ordering::SeqCst), 1);
    }
}
