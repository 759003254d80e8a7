//! View models for the task list.
//!
//! Views share one [`TodoContext`]: the resource client, the query cache and
//! the invalidation policy. Every mutation goes through the client and then
//! invalidates [`COLLECTION_KEY`], which makes the cache refetch and every
//! [`ListView`] observe the new collection. Rendering produces plain text.

mod form;
mod item;
mod list;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::cache::{QueryCache, QueryHandle};
use crate::config::InvalidationPolicy;
use crate::resource::ResourceClient;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::Task;

pub use form::CreateForm;
pub use item::ItemView;
pub use list::{ListState, ListView, EMPTY_MESSAGE, LOADING_MESSAGE};

/// Holds a pending flag for as long as an action is in flight.
pub(crate) struct Busy<'a>(&'a AtomicBool);

impl<'a> Busy<'a> {
    pub(crate) fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Busy(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Cache key the whole task collection is stored under.
pub const COLLECTION_KEY: &str = "todos";

pub type TaskCache = QueryCache<Vec<Task>>;

/// Dependencies shared by every view.
pub struct TodoContext<T = ReqwestTransport> {
    pub client: Arc<ResourceClient<T>>,
    pub cache: Arc<TaskCache>,
    pub policy: InvalidationPolicy,
}

impl<T> Clone for TodoContext<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            policy: self.policy,
        }
    }
}

impl<T: Transport + 'static> TodoContext<T> {
    pub fn new(client: ResourceClient<T>, cache: Arc<TaskCache>, policy: InvalidationPolicy) -> Self {
        Self {
            client: Arc::new(client),
            cache,
            policy,
        }
    }

    /// Subscribe to the task collection, fetching it if nothing fresh is cached.
    pub fn tasks(&self) -> QueryHandle<Vec<Task>> {
        let client = Arc::clone(&self.client);
        self.cache.query(COLLECTION_KEY, move || {
            let client = Arc::clone(&client);
            async move { client.list().await }
        })
    }

    /// Called by every view once a mutation finishes.
    pub(crate) fn mutation_settled(&self, succeeded: bool) {
        if self.policy.should_invalidate(succeeded) {
            self.cache.invalidate(COLLECTION_KEY);
        } else {
            debug!(policy = ?self.policy, "skipping invalidation after failed mutation");
        }
    }
}
