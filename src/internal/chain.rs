//! Resolution chain for cycle detection.
//!
//! One chain exists per top-level resolve call and is threaded by
//! reference through every recursive sub-resolution. It is never shared
//! across threads and never outlives the call that created it.

use crate::error::{ResolveError, ResolveResult};
use crate::key::Key;

const MAX_DEPTH: usize = 1024;

/// Ordered set of keys currently being constructed within one top-level
/// resolve call.
///
/// Invariant: a key appears at most once. A duplicate `enter` is the
/// cycle-detection trigger and produces the ordered path from the first
/// occurrence of the repeated key, e.g. `[A, B, A]`.
#[derive(Default)]
pub(crate) struct ResolutionChain {
    frames: Vec<Key>,
}

impl ResolutionChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pushes `key` onto the chain, failing on a duplicate or when the
    /// depth guard trips.
    pub(crate) fn enter(&mut self, key: &Key) -> ResolveResult<()> {
        if let Some(pos) = self.frames.iter().position(|k| k == key) {
            let mut path: Vec<&'static str> = self.frames[pos..]
                .iter()
                .map(|k| k.display_name())
                .collect();
            path.push(key.display_name());
            return Err(ResolveError::Cyclic(path));
        }
        if self.frames.len() >= MAX_DEPTH {
            return Err(ResolveError::DepthExceeded(self.frames.len()));
        }
        self.frames.push(key.clone());
        Ok(())
    }

    /// Pops `key` from the chain. Called on both the success and error
    /// paths of a frame so sibling branches of the same top-level call
    /// are unaffected.
    pub(crate) fn exit(&mut self, key: &Key) {
        if let Some(last) = self.frames.pop() {
            debug_assert_eq!(&last, key);
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}
