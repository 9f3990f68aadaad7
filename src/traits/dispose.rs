//! Disposal traits for resource teardown.

/// Trait for synchronous resource teardown.
///
/// Implement this for bindings that need structured cleanup (flushing
/// caches, closing handles). Registered teardown hooks run in LIFO order
/// when the owning scope ends or the container is closed.
///
/// # Examples
///
/// ```
/// use bindery::{BindingSet, Dispose, Resolver};
/// use std::sync::Arc;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_singleton_factory::<Cache, _>(|ctx| {
///     let cache = Arc::new(Cache { name: "user_cache".to_string() });
///     ctx.register_disposer(cache.clone());
///     Cache { name: "user_cache".to_string() } // Return concrete type
/// });
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous resource teardown.
///
/// Implement this for bindings that require async cleanup (graceful
/// connection shutdown, async I/O flush). Async teardown hooks run before
/// sync hooks, each group in LIFO order.
///
/// # Examples
///
/// ```
/// use bindery::{AsyncDispose, BindingSet, Resolver};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) {
///         println!("Closing database connection: {}", self.connection_id);
///     }
/// }
///
/// let mut bindings = BindingSet::new();
/// bindings.add_singleton_factory::<DatabaseClient, _>(|ctx| {
///     let client = Arc::new(DatabaseClient {
///         connection_id: "conn_123".to_string(),
///     });
///     ctx.register_async_disposer(client.clone());
///     DatabaseClient { connection_id: "conn_123".to_string() }
/// });
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}
