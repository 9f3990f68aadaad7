//! Binding descriptors and the creation state machine.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ResolveResult;
use crate::key::Key;
use crate::metadata::BindingMetadata;
use crate::provider::ResolverContext;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Composite construction function: factory, then member injectors, then
/// the post-construct hook. Assembled at registration time where the
/// concrete type is known.
pub(crate) type FactoryFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> ResolveResult<AnyArc> + Send + Sync>;

/// Type-erased pre-destroy hook; downcasts internally.
pub(crate) type PreDestroyFn = Arc<dyn Fn(&AnyArc) + Send + Sync>;

/// Creation state of a container-cached binding.
///
/// `Uncreated -> Creating -> Created` for cacheable scopes; prototype
/// bindings never enter this machine. A failed construction reverts to
/// `Uncreated` so a later call may retry.
pub(crate) enum CreationState {
    Uncreated,
    Creating,
    Created(AnyArc),
}

/// One registered type/implementation pair.
///
/// The descriptor part (key, metadata, factory, hooks) is immutable after
/// registration; the creation state is mutated only by the resolution
/// algorithm under the per-binding lock.
pub(crate) struct Binding {
    pub(crate) key: Key,
    pub(crate) metadata: BindingMetadata,
    pub(crate) ctor: FactoryFn,
    pub(crate) pre_destroy: Option<PreDestroyFn>,
    state: Mutex<CreationState>,
}

impl Binding {
    pub(crate) fn new(
        key: Key,
        metadata: BindingMetadata,
        ctor: FactoryFn,
        pre_destroy: Option<PreDestroyFn>,
    ) -> Self {
        Self {
            key,
            metadata,
            ctor,
            pre_destroy,
            state: Mutex::new(CreationState::Uncreated),
        }
    }

    /// Pre-seeded binding already in the created state. The factory is
    /// kept only so an explicit reset can re-create the instance; the
    /// resolution algorithm never invokes it while the seed is cached.
    pub(crate) fn preseeded(
        key: Key,
        metadata: BindingMetadata,
        ctor: FactoryFn,
        instance: AnyArc,
    ) -> Self {
        Self {
            key,
            metadata,
            ctor,
            pre_destroy: None,
            state: Mutex::new(CreationState::Created(instance)),
        }
    }

    /// Resolves a container-cached binding through the state machine.
    ///
    /// The per-binding lock is held across construction, so exactly one
    /// concurrent caller builds the instance; the rest block and observe
    /// `Created` on release. Construction recurses into dependent
    /// bindings while the lock is held; the resolution chain rejects
    /// cyclic eager graphs before any lock is taken, so cyclic lock
    /// acquisition is structurally impossible.
    ///
    /// Returns the instance and whether this call performed the
    /// construction (so the caller can register pre-destroy hooks once).
    pub(crate) fn resolve_cached(
        &self,
        ctx: &ResolverContext<'_>,
    ) -> ResolveResult<(AnyArc, bool)> {
        let mut state = self.state.lock();
        if let CreationState::Created(instance) = &*state {
            return Ok((instance.clone(), false));
        }
        *state = CreationState::Creating;
        match (self.ctor)(ctx) {
            Ok(instance) => {
                *state = CreationState::Created(instance.clone());
                Ok((instance, true))
            }
            Err(err) => {
                // Unconditional revert: never park in Creating.
                *state = CreationState::Uncreated;
                Err(err)
            }
        }
    }

    /// Constructs an instance without touching the state machine.
    /// Used for prototype resolution and as the construction template
    /// for scope stores.
    pub(crate) fn construct(&self, ctx: &ResolverContext<'_>) -> ResolveResult<AnyArc> {
        (self.ctor)(ctx)
    }

    /// Clears the cached instance back to `Uncreated`.
    pub(crate) fn reset(&self) {
        *self.state.lock() = CreationState::Uncreated;
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn is_created(&self) -> bool {
        matches!(&*self.state.lock(), CreationState::Created(_))
    }
}
