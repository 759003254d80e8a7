//! Observable query cache keyed by string.
//!
//! Each key owns one fetcher, one `watch` channel carrying its
//! [`QueryState`], and a flight marker. At most one fetch per key runs at a
//! time:
//!
//! - `Idle` → an invalidation schedules a fetch.
//! - `Scheduled` → further invalidations coalesce into the pending fetch.
//! - `Running` → invalidations set `rerun`, and exactly one follow-up fetch
//!   starts once the current one settles, so the published snapshot always
//!   comes from a fetch that began after the latest invalidation.
//!
//! The cache is an ordinary value; consumers receive it as an `Arc`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::lock::mutex_lock;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No fetch has resolved yet.
    Pending,
    /// The latest fetch failed. `data` still holds the last good snapshot.
    Error,
    Ready,
}

#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub status: QueryStatus,
    pub error: Option<ApiError>,
    /// A fetch is scheduled or running.
    pub fetching: bool,
    /// `data` predates the latest invalidation.
    pub stale: bool,
}

impl<T> QueryState<T> {
    fn pending() -> Self {
        Self {
            data: None,
            status: QueryStatus::Pending,
            error: None,
            fetching: false,
            stale: false,
        }
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            fetching: self.fetching,
            stale: self.stale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flight {
    Idle,
    Scheduled,
    Running { rerun: bool },
}

struct Entry<T> {
    fetcher: Fetcher<T>,
    state: watch::Sender<QueryState<T>>,
    flight: Flight,
}

pub struct QueryCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `key`, fetching with `fetch` when nothing fresh is cached.
    ///
    /// Returns immediately with the current state. The latest `fetch` passed
    /// for a key replaces the previous one. Must be called within a Tokio
    /// runtime.
    pub fn query<F, Fut>(self: &Arc<Self>, key: &str, fetch: F) -> QueryHandle<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());

        let mut entries = self.lock("query");
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            fetcher: Arc::clone(&fetcher),
            state: watch::Sender::new(QueryState::pending()),
            flight: Flight::Idle,
        });
        entry.fetcher = fetcher;

        let receiver = entry.state.subscribe();
        // A scheduled or running fetch already covers the latest
        // invalidation; new readers only subscribe to it.
        let needs_fetch = entry.flight == Flight::Idle && {
            let state = entry.state.borrow();
            state.data.is_none() || state.stale
        };
        if needs_fetch {
            Self::schedule(self, key, entry);
        }
        drop(entries);

        QueryHandle {
            key: key.to_string(),
            cache: Arc::clone(self),
            receiver,
        }
    }

    /// Mark `key` stale and refetch in the background.
    ///
    /// Returns `false` when nothing has queried `key` yet.
    pub fn invalidate(self: &Arc<Self>, key: &str) -> bool {
        let mut entries = self.lock("invalidate");
        let Some(entry) = entries.get_mut(key) else {
            debug!(key, "invalidate on unknown query key");
            return false;
        };
        entry.state.send_modify(|state| state.stale = true);
        Self::schedule(self, key, entry);
        true
    }

    /// Current state for `key` without subscribing.
    pub fn snapshot(&self, key: &str) -> Option<QueryState<T>> {
        self.lock("snapshot")
            .get(key)
            .map(|entry| entry.state.borrow().clone())
    }

    fn schedule(cache: &Arc<Self>, key: &str, entry: &mut Entry<T>) {
        match entry.flight {
            Flight::Idle => {
                entry.flight = Flight::Scheduled;
                entry.state.send_modify(|state| state.fetching = true);
                tokio::spawn(Arc::clone(cache).run_fetch(key.to_string()));
            }
            Flight::Scheduled => debug!(key, "fetch already scheduled; coalesced"),
            Flight::Running { ref mut rerun } => *rerun = true,
        }
    }

    async fn run_fetch(self: Arc<Self>, key: String) {
        loop {
            let Some(fetcher) = self.begin_flight(&key) else {
                return;
            };
            debug!(key = %key, "fetching query");
            let result = fetcher().await;
            if !self.finish_flight(&key, result) {
                return;
            }
        }
    }

    fn begin_flight(&self, key: &str) -> Option<Fetcher<T>> {
        let mut entries = self.lock("begin_flight");
        let entry = entries.get_mut(key)?;
        entry.flight = Flight::Running { rerun: false };
        Some(Arc::clone(&entry.fetcher))
    }

    /// Publish `result`. Returns `true` when a follow-up fetch is owed.
    fn finish_flight(&self, key: &str, result: Result<T, ApiError>) -> bool {
        let mut entries = self.lock("finish_flight");
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        let rerun = matches!(entry.flight, Flight::Running { rerun: true });
        entry.flight = if rerun { Flight::Scheduled } else { Flight::Idle };

        entry.state.send_modify(|state| {
            match result {
                Ok(value) => {
                    state.data = Some(Arc::new(value));
                    state.status = QueryStatus::Ready;
                    state.error = None;
                    state.stale = rerun;
                }
                Err(err) => {
                    warn!(key, error = %err, "query fetch failed");
                    state.status = QueryStatus::Error;
                    state.error = Some(err);
                }
            }
            state.fetching = rerun;
        });
        rerun
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, HashMap<String, Entry<T>>> {
        mutex_lock(&self.entries, "cache", op)
    }
}

/// A consumer's subscription to one cache key.
pub struct QueryHandle<T> {
    key: String,
    cache: Arc<QueryCache<T>>,
    receiver: watch::Receiver<QueryState<T>>,
}

impl<T: Send + Sync + 'static> QueryHandle<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> QueryState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change.
    pub async fn changed(&mut self) -> QueryState<T> {
        // The sender lives in the cache this handle keeps alive.
        let _ = self.receiver.changed().await;
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until no fetch is scheduled or running for this key.
    pub async fn settled(&mut self) -> QueryState<T> {
        loop {
            {
                let state = self.receiver.borrow_and_update();
                if !state.fetching {
                    return state.clone();
                }
            }
            if self.receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    pub fn invalidate(&self) -> bool {
        self.cache.invalidate(&self.key)
    }
}
