//! Query observer
//!
//! Tracks one query whose parameters may change over time and publishes its
//! state. A refresh started for an older parameter set never overwrites the
//! state of the current one.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{QueryCache, QueryEventKind};
use crate::domain::query::{Query, QueryKey, QueryState};

struct Current<Q> {
    query: Q,
    generation: u64,
}

struct ObserverInner<Q: Query> {
    cache: QueryCache,
    current: Mutex<Current<Q>>,
    state: watch::Sender<QueryState<Vec<Q::Row>>>,
}

/// Observable handle over a single query
pub struct QueryObserver<Q: Query> {
    inner: Arc<ObserverInner<Q>>,
}

impl<Q: Query> Clone for QueryObserver<Q> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn initial_state<Q: Query>(query: &Q) -> QueryState<Vec<Q::Row>> {
    if query.is_enabled() {
        QueryState::Loading
    } else {
        QueryState::Idle
    }
}

impl<Q> QueryObserver<Q>
where
    Q: Query + Clone + 'static,
    Q::Row: Clone + Sync + 'static,
{
    pub fn new(cache: QueryCache, query: Q) -> Self {
        let (state, _) = watch::channel(initial_state(&query));

        Self {
            inner: Arc::new(ObserverInner {
                cache,
                current: Mutex::new(Current {
                    query,
                    generation: 0,
                }),
                state,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Current<Q>> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn query(&self) -> Q {
        self.lock().query.clone()
    }

    pub fn key(&self) -> QueryKey {
        self.lock().query.key()
    }

    /// Replace the parameters; any in-flight refresh becomes obsolete
    ///
    /// Returns false when the new parameters map to the same key.
    pub fn set_query(&self, query: Q) -> bool {
        let mut current = self.lock();

        if current.query.key() == query.key() {
            return false;
        }

        current.generation += 1;
        self.inner.state.send_replace(initial_state(&query));
        current.query = query;
        true
    }

    /// Fetch through the cache and publish the result
    ///
    /// The returned state is the observer's state afterwards, which is not
    /// this fetch's result if the query changed meanwhile.
    pub async fn refresh(&self) -> QueryState<Vec<Q::Row>> {
        let (query, generation) = {
            let current = self.lock();
            (current.query.clone(), current.generation)
        };

        let result = if query.is_enabled() {
            QueryState::from_result(self.inner.cache.fetch_query(&query).await)
        } else {
            QueryState::Idle
        };

        self.publish(generation, result)
    }

    /// Publish `result` unless the query changed since `generation`
    fn publish(
        &self,
        generation: u64,
        result: QueryState<Vec<Q::Row>>,
    ) -> QueryState<Vec<Q::Row>> {
        let current = self.lock();
        if current.generation != generation {
            debug!(
                capability = Q::CAPABILITY,
                generation,
                current = current.generation,
                "Discarding result of superseded query"
            );
            return self.inner.state.borrow().clone();
        }

        self.inner.state.send_replace(result.clone());
        result
    }

    pub fn state(&self) -> QueryState<Vec<Q::Row>> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<QueryState<Vec<Q::Row>>> {
        self.inner.state.subscribe()
    }

    /// Refresh whenever the current key is invalidated in the cache
    ///
    /// Runs until the returned task is aborted.
    pub fn refetch_on_invalidate(&self) -> JoinHandle<()> {
        let mut events = self.inner.cache.subscribe();
        let observer = self.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event)
                        if event.kind == QueryEventKind::Invalidated
                            && event.key == observer.key() =>
                    {
                        debug!(key = %event.key, "Refetching invalidated query");
                        observer.refresh().await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
