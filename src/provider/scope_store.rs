//! Keyed scope stores for session and request lifecycles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::binding::{AnyArc, Binding};
use crate::error::{ResolveError, ResolveResult};
use crate::internal::HookBag;
use crate::key::Key;
use crate::provider::ResolverContext;
use crate::scope::ScopeKind;

/// Per-key instance cache with an explicit begin/end lifecycle.
///
/// One store exists per keyed scope kind. Entries are created on first
/// resolution inside an active scope and destroyed when the scope ends,
/// running the scope's teardown hooks in LIFO order. Resolution against a
/// key that was never begun is a contract violation, never a silent
/// auto-begin.
pub(crate) struct ScopeStore {
    scope: ScopeKind,
    active: Mutex<HashMap<String, Arc<ActiveScope>>>,
}

struct ActiveScope {
    slots: Mutex<HashMap<Key, Arc<Slot>>>,
    hooks: Mutex<HookBag>,
}

// Per-entry lock so two bindings in the same scope construct in
// parallel, while two callers racing on one entry construct it once.
struct Slot(Mutex<Option<AnyArc>>);

impl ScopeStore {
    pub(crate) fn new(scope: ScopeKind) -> Self {
        debug_assert!(scope.is_keyed());
        Self {
            scope,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Activates a scope key. Idempotent: beginning an already-active key
    /// leaves its entries untouched.
    pub(crate) fn begin(&self, key: impl Into<String>) {
        self.active
            .lock()
            .entry(key.into())
            .or_insert_with(|| {
                Arc::new(ActiveScope {
                    slots: Mutex::new(HashMap::new()),
                    hooks: Mutex::new(HookBag::default()),
                })
            });
    }

    /// Returns `true` if the key currently has an active scope.
    pub(crate) fn is_active(&self, key: &str) -> bool {
        self.active.lock().contains_key(key)
    }

    /// Deactivates a scope key, evicting its entries and running its
    /// sync teardown hooks in LIFO order. Pending async hooks cannot run
    /// here and are reported; use [`end_async`](Self::end_async) when the
    /// scope holds async disposers.
    pub(crate) fn end(&self, key: &str) {
        if let Some(scope) = self.active.lock().remove(key) {
            let mut hooks = scope.hooks.lock();
            if hooks.has_async() {
                eprintln!(
                    "bindery: {} scope '{}' ended synchronously with pending async teardown hooks",
                    self.scope, key
                );
            }
            hooks.run_sync_lifo();
        }
    }

    /// Deactivates a scope key, running async teardown hooks first and
    /// then sync hooks, each group in LIFO order.
    pub(crate) async fn end_async(&self, key: &str) {
        let scope = self.active.lock().remove(key);
        if let Some(scope) = scope {
            let mut bag = {
                let mut hooks = scope.hooks.lock();
                std::mem::take(&mut *hooks)
            };
            bag.run_async_lifo().await;
            bag.run_sync_lifo();
        }
    }

    /// Ends every active key. Used on container close.
    pub(crate) fn end_all(&self) {
        let keys: Vec<String> = self.active.lock().keys().cloned().collect();
        for key in keys {
            self.end(&key);
        }
    }

    /// Async variant of [`end_all`](Self::end_all).
    pub(crate) async fn end_all_async(&self) {
        let keys: Vec<String> = self.active.lock().keys().cloned().collect();
        for key in keys {
            self.end_async(&key).await;
        }
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// Returns the cached instance for `(key, binding)`, constructing and
    /// storing it atomically on first call.
    ///
    /// The binding serves only as a construction template here; keyed
    /// instances never park inside the binding's own state machine.
    /// Construction runs under the entry's lock with teardown hooks
    /// rebound to this scope, so disposers registered by the factory and
    /// the binding's pre-destroy hook fire when the scope ends.
    pub(crate) fn get_or_create(
        &self,
        scope_key: Option<&str>,
        binding: &Binding,
        ctx: &ResolverContext<'_>,
    ) -> ResolveResult<AnyArc> {
        let scope_key = scope_key.ok_or(ResolveError::ScopeNotActive {
            scope: self.scope,
            scope_key: None,
        })?;
        let scope = self
            .active
            .lock()
            .get(scope_key)
            .cloned()
            .ok_or_else(|| ResolveError::ScopeNotActive {
                scope: self.scope,
                scope_key: Some(scope_key.to_string()),
            })?;

        let slot = scope
            .slots
            .lock()
            .entry(binding.key.clone())
            .or_insert_with(|| Arc::new(Slot(Mutex::new(None))))
            .clone();

        let mut cell = slot.0.lock();
        if let Some(instance) = &*cell {
            return Ok(instance.clone());
        }
        let scoped_ctx = ctx.with_hooks(&scope.hooks);
        let instance = binding.construct(&scoped_ctx)?;
        if let Some(pre_destroy) = &binding.pre_destroy {
            let hook_instance = instance.clone();
            let pre_destroy = pre_destroy.clone();
            scope
                .hooks
                .lock()
                .push_sync(Box::new(move || pre_destroy(&hook_instance)));
        }
        *cell = Some(instance.clone());
        Ok(instance)
    }
}
