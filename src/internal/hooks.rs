//! Internal hook bag for pre-destroy and disposal callbacks.

use std::future::Future;
use std::pin::Pin;

/// Future type for asynchronous teardown hooks.
pub type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Container for teardown hooks with LIFO execution order.
///
/// Holds both synchronous and asynchronous hooks. Async hooks run first
/// (in reverse registration order), then sync hooks (also reversed).
#[derive(Default)]
pub(crate) struct HookBag {
    sync: Vec<Box<dyn FnOnce() + Send>>,
    asyncs: Vec<Box<dyn FnOnce() -> BoxFutureUnit + Send>>,
}

impl HookBag {
    /// Add a synchronous teardown hook.
    pub(crate) fn push_sync(&mut self, f: Box<dyn FnOnce() + Send>) {
        self.sync.push(f);
    }

    /// Add an asynchronous teardown hook.
    pub(crate) fn push_async(&mut self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.asyncs.push(f);
    }

    /// Execute all sync hooks in reverse order (LIFO).
    pub(crate) fn run_sync_lifo(&mut self) {
        while let Some(f) = self.sync.pop() {
            (f)();
        }
    }

    /// Execute all async hooks in reverse order (LIFO).
    pub(crate) async fn run_async_lifo(&mut self) {
        while let Some(f) = self.asyncs.pop() {
            (f)().await;
        }
    }

    /// Returns `true` if no hooks are registered.
    pub(crate) fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asyncs.is_empty()
    }

    /// Returns `true` if async hooks are pending.
    pub(crate) fn has_async(&self) -> bool {
        !self.asyncs.is_empty()
    }
}
