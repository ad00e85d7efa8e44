//! Query cache backed by moka
//!
//! - Entries are keyed by [`QueryKey`] and hold the raw rows of one fetch
//! - Concurrent misses on one key share a single remote call
//! - Freshness is decided per query (`Query::stale_time`)
//! - Eviction is left to moka (`max_capacity`, `gc_time` as time-to-idle)
//! - Invalidation also revokes fetches still in flight, so their rows are
//!   never served as fresh afterwards

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::data_service::{execute, DataRequest, DataServiceClient};
use crate::domain::query::{Query, QueryData, QueryKey, StalePolicy};
use crate::domain::DomainError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for the query cache
#[derive(Debug, Clone)]
pub struct QueryCacheConfig {
    /// Maximum number of cached query results
    pub max_capacity: u64,
    /// Entries not accessed for this long are garbage collected
    pub gc_time: Duration,
    pub stale_policy: StalePolicy,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            gc_time: Duration::from_secs(30 * 60),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl QueryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }
}

/// What happened to a cache slot
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEventKind {
    Fetched { rows: usize },
    Failed { message: String },
    Invalidated,
}

/// Notification sent to cache subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEvent {
    pub key: QueryKey,
    pub kind: QueryEventKind,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    rows: Arc<Vec<Value>>,
    fetched_at: Instant,
    updated_at: DateTime<Utc>,
    stale_time: Duration,
    /// Set when the key was invalidated while this entry was being fetched
    revoked: Arc<AtomicBool>,
}

impl CacheEntry {
    fn new(rows: Vec<Value>, stale_time: Duration, revoked: Arc<AtomicBool>) -> Self {
        Self {
            rows: Arc::new(rows),
            fetched_at: Instant::now(),
            updated_at: Utc::now(),
            stale_time,
            revoked,
        }
    }

    fn is_stale(&self) -> bool {
        self.fetched_at.elapsed() >= self.stale_time
    }

    fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct InFlight {
    next_id: u64,
    fetches: HashMap<u64, (QueryKey, Arc<AtomicBool>)>,
}

fn lock_in_flight(in_flight: &Mutex<InFlight>) -> MutexGuard<'_, InFlight> {
    in_flight
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registration of one remote fetch; unregistered on drop
struct FetchTicket {
    id: u64,
    revoked: Arc<AtomicBool>,
    in_flight: Arc<Mutex<InFlight>>,
}

impl FetchTicket {
    fn new(in_flight: &Arc<Mutex<InFlight>>, key: &QueryKey) -> Self {
        let revoked = Arc::new(AtomicBool::new(false));
        let mut registry = lock_in_flight(in_flight);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .fetches
            .insert(id, (key.clone(), Arc::clone(&revoked)));

        Self {
            id,
            revoked,
            in_flight: Arc::clone(in_flight),
        }
    }

    fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }
}

impl Drop for FetchTicket {
    fn drop(&mut self) {
        lock_in_flight(&self.in_flight).fetches.remove(&self.id);
    }
}

/// Explicit cache of query results
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    client: Arc<dyn DataServiceClient>,
    entries: MokaCache<QueryKey, CacheEntry>,
    refreshing: Arc<Mutex<HashSet<QueryKey>>>,
    in_flight: Arc<Mutex<InFlight>>,
    events: broadcast::Sender<QueryEvent>,
    config: QueryCacheConfig,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .field("config", &self.config)
            .finish()
    }
}

impl QueryCache {
    pub fn new(client: Arc<dyn DataServiceClient>) -> Self {
        Self::with_config(client, QueryCacheConfig::default())
    }

    pub fn with_config(client: Arc<dyn DataServiceClient>, config: QueryCacheConfig) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(config.gc_time)
            .build();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            client,
            entries,
            refreshing: Arc::new(Mutex::new(HashSet::new())),
            in_flight: Arc::new(Mutex::new(InFlight::default())),
            events,
            config,
        }
    }

    /// The data service this cache reads from
    pub fn client(&self) -> &Arc<dyn DataServiceClient> {
        &self.client
    }

    pub fn config(&self) -> &QueryCacheConfig {
        &self.config
    }

    /// Get-or-fetch
    ///
    /// Returns `Ok(None)` without any remote call when the query is disabled.
    pub async fn fetch_query<Q: Query>(
        &self,
        query: &Q,
    ) -> Result<Option<QueryData<Vec<Q::Row>>>, DomainError> {
        if !query.is_enabled() {
            debug!(capability = Q::CAPABILITY, "Query disabled, skipping fetch");
            return Ok(None);
        }

        let key = query.key();
        let (entry, is_stale) = self.load(&key, query).await?;
        let rows = decode_rows::<Q::Row>(&key, &entry.rows)?;

        Ok(Some(QueryData {
            rows,
            updated_at: entry.updated_at,
            is_stale,
        }))
    }

    async fn load<Q: Query>(
        &self,
        key: &QueryKey,
        query: &Q,
    ) -> Result<(CacheEntry, bool), DomainError> {
        match self.entries.get(key).await {
            Some(entry) if entry.is_revoked() => {
                debug!(key = %key, "Query cache entry revoked, refetching");
                self.entries.invalidate(key).await;
            }
            Some(entry) if !entry.is_stale() => {
                debug!(key = %key, "Query cache hit");
                return Ok((entry, false));
            }
            Some(entry) => match self.config.stale_policy {
                StalePolicy::ServeStale => {
                    debug!(key = %key, "Serving stale rows while refreshing");
                    self.spawn_refresh(key.clone(), query.request(), query.stale_time());
                    return Ok((entry, true));
                }
                StalePolicy::Revalidate => {
                    debug!(key = %key, "Query cache entry stale, refetching");
                    self.entries.invalidate(key).await;
                }
            },
            None => {}
        }

        let entry = self
            .fetch_entry(key, query.request(), query.stale_time())
            .await?;

        Ok((entry, false))
    }

    async fn fetch_entry(
        &self,
        key: &QueryKey,
        request: DataRequest,
        stale_time: Duration,
    ) -> Result<CacheEntry, DomainError> {
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let event_key = key.clone();
        // Held until moka has stored the entry
        let ticket = FetchTicket::new(&self.in_flight, key);
        let revoked = Arc::clone(&ticket.revoked);

        let entry = self
            .entries
            .try_get_with(key.clone(), async move {
                debug!(key = %event_key, target = %request.target(), "Fetching query");

                match execute(client.as_ref(), &request).await {
                    Ok(rows) => {
                        let _ = events.send(QueryEvent {
                            key: event_key,
                            kind: QueryEventKind::Fetched { rows: rows.len() },
                        });
                        Ok(CacheEntry::new(rows, stale_time, revoked))
                    }
                    Err(e) => {
                        warn!(key = %event_key, error = %e, "Query fetch failed");
                        let _ = events.send(QueryEvent {
                            key: event_key,
                            kind: QueryEventKind::Failed {
                                message: e.to_string(),
                            },
                        });
                        Err(e)
                    }
                }
            })
            .await
            .map_err(|e| (*e).clone())?;

        drop(ticket);
        Ok(entry)
    }

    fn spawn_refresh(&self, key: QueryKey, request: DataRequest, stale_time: Duration) {
        {
            let mut refreshing = self
                .refreshing
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if !refreshing.insert(key.clone()) {
                return;
            }
        }

        let cache = self.clone();
        let ticket = FetchTicket::new(&self.in_flight, &key);

        tokio::spawn(async move {
            match execute(cache.client.as_ref(), &request).await {
                Ok(_) if ticket.is_revoked() => {
                    debug!(key = %key, "Discarding background refresh of invalidated query");
                }
                Ok(rows) => {
                    let count = rows.len();
                    let entry = CacheEntry::new(rows, stale_time, Arc::clone(&ticket.revoked));
                    cache.entries.insert(key.clone(), entry).await;
                    cache.emit(&key, QueryEventKind::Fetched { rows: count });
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Background refresh failed");
                    // The next access fetches in the foreground and reports the error
                    cache.entries.invalidate(&key).await;
                    cache.emit(
                        &key,
                        QueryEventKind::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }

            drop(ticket);
            cache
                .refreshing
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&key);
        });
    }

    /// Drop one cached result; the next access refetches
    pub async fn invalidate(&self, key: &QueryKey) {
        self.revoke_in_flight(|in_flight| in_flight == key);
        self.entries.invalidate(key).await;
        self.emit(key, QueryEventKind::Invalidated);
    }

    /// Mark matching in-flight fetches so their rows are not served as fresh
    fn revoke_in_flight(&self, predicate: impl Fn(&QueryKey) -> bool) -> Vec<QueryKey> {
        let registry = lock_in_flight(&self.in_flight);
        let mut revoked = Vec::new();

        for (key, flag) in registry.fetches.values() {
            if predicate(key) {
                flag.store(true, Ordering::SeqCst);
                revoked.push(key.clone());
            }
        }

        revoked
    }

    /// Drop every cached or in-flight result of a capability, returning how
    /// many keys were dropped
    pub async fn invalidate_capability(&self, capability: &str) -> usize {
        self.invalidate_where(|key| key.capability() == capability)
            .await
    }

    /// Drop everything
    pub async fn invalidate_all(&self) -> usize {
        self.invalidate_where(|_| true).await
    }

    async fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut keys: HashSet<QueryKey> = self.revoke_in_flight(&predicate).into_iter().collect();

        self.entries.run_pending_tasks().await;
        keys.extend(
            self.entries
                .iter()
                .filter(|(key, _)| predicate(key))
                .map(|(key, _)| (*key).clone()),
        );

        for key in &keys {
            self.invalidate(key).await;
        }

        debug!(count = keys.len(), "Invalidated cached queries");
        keys.len()
    }

    /// Receive every cache event
    pub fn subscribe(&self) -> broadcast::Receiver<QueryEvent> {
        self.events.subscribe()
    }

    /// Receive the events of a single key
    pub fn subscribe_key(&self, key: QueryKey) -> KeySubscription {
        KeySubscription {
            key,
            receiver: self.events.subscribe(),
        }
    }

    /// Whether a result for `key` is cached, fresh or stale
    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.entries.get(key).await.is_some()
    }

    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    fn emit(&self, key: &QueryKey, kind: QueryEventKind) {
        // No subscribers is not an error
        let _ = self.events.send(QueryEvent {
            key: key.clone(),
            kind,
        });
    }
}

/// Event stream filtered to one key
#[derive(Debug)]
pub struct KeySubscription {
    key: QueryKey,
    receiver: broadcast::Receiver<QueryEvent>,
}

impl KeySubscription {
    /// Wait for the next event of this key; `None` once the cache is gone
    pub async fn next(&mut self) -> Option<QueryEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.key == self.key => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(key = %self.key, skipped, "Subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

fn decode_rows<R: DeserializeOwned>(key: &QueryKey, rows: &[Value]) -> Result<Vec<R>, DomainError> {
    rows.iter()
        .map(|row| {
            serde_json::from_value(row.clone()).map_err(|e| {
                DomainError::decode(format!("Failed to decode row of {}: {}", key.capability(), e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data_service::{
        ColumnFilter, MockDataServiceClient, ProcedureCall, TableSelect,
    };
    use crate::domain::{ContentGapsQuery, HybridSearchQuery, KeywordRecommendationsQuery};
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Row {
        id: u32,
    }

    #[derive(Debug, Clone)]
    struct TestQuery {
        id: &'static str,
        stale_time: Duration,
    }

    impl TestQuery {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                stale_time: Duration::from_secs(60),
            }
        }

        fn always_stale(id: &'static str) -> Self {
            Self {
                id,
                stale_time: Duration::ZERO,
            }
        }
    }

    impl Query for TestQuery {
        type Row = Row;
        const CAPABILITY: &'static str = "test";

        fn key(&self) -> QueryKey {
            QueryKey::new(Self::CAPABILITY).with(self.id)
        }

        fn request(&self) -> DataRequest {
            ProcedureCall::new("test_rows").arg("id", self.id).into()
        }

        fn stale_time(&self) -> Duration {
            self.stale_time
        }
    }

    fn rows(ids: &[u32]) -> Vec<Value> {
        ids.iter().map(|id| serde_json::json!({"id": id})).collect()
    }

    fn cache_with(client: MockDataServiceClient) -> QueryCache {
        QueryCache::new(Arc::new(client))
    }

    /// Holds the first procedure call until released; call `n` returns row `n`
    #[derive(Debug, Default)]
    struct GatedClient {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DataServiceClient for GatedClient {
        async fn call_procedure(&self, _call: &ProcedureCall) -> Result<Vec<Value>, DomainError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                self.gate.notified().await;
            }
            Ok(rows(&[n as u32]))
        }

        async fn select(&self, _select: &TableSelect) -> Result<Vec<Value>, DomainError> {
            Ok(vec![])
        }

        async fn update(
            &self,
            _table: &str,
            _filters: &[ColumnFilter],
            _patch: &Value,
        ) -> Result<Vec<Value>, DomainError> {
            Ok(vec![])
        }
    }

    async fn wait_for_call(client: &GatedClient) {
        while client.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_identical_queries_call_remote_once() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .times(1)
            .returning(|_| Ok(rows(&[1, 2])));
        let cache = cache_with(client);

        let first = cache.fetch_query(&TestQuery::new("a")).await.unwrap().unwrap();
        let second = cache.fetch_query(&TestQuery::new("a")).await.unwrap().unwrap();

        assert_eq!(first.rows, vec![Row { id: 1 }, Row { id: 2 }]);
        assert_eq!(second.rows, first.rows);
        assert!(!second.is_stale);
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_one_fetch() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .times(1)
            .returning(|_| Ok(rows(&[7])));
        let cache = cache_with(client);

        let query = TestQuery::new("a");
        let (a, b, c) = tokio::join!(
            cache.fetch_query(&query),
            cache.fetch_query(&query),
            cache.fetch_query(&query)
        );

        for result in [a, b, c] {
            assert_eq!(result.unwrap().unwrap().rows, vec![Row { id: 7 }]);
        }
    }

    #[tokio::test]
    async fn test_different_keys_fetch_separately() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .times(2)
            .returning(|_| Ok(rows(&[1])));
        let cache = cache_with(client);

        assert_ok!(cache.fetch_query(&TestQuery::new("a")).await);
        assert_ok!(cache.fetch_query(&TestQuery::new("b")).await);
    }

    #[tokio::test]
    async fn test_stale_entry_refetched() {
        let mut client = MockDataServiceClient::new();
        let mut calls = 0u32;
        client.expect_call_procedure().times(2).returning(move |_| {
            calls += 1;
            Ok(rows(&[calls]))
        });
        let cache = cache_with(client);

        let query = TestQuery::always_stale("a");
        let first = cache.fetch_query(&query).await.unwrap().unwrap();
        let second = cache.fetch_query(&query).await.unwrap().unwrap();

        assert_eq!(first.rows, vec![Row { id: 1 }]);
        assert_eq!(second.rows, vec![Row { id: 2 }]);
        assert!(!second.is_stale);
    }

    #[tokio::test]
    async fn test_error_not_masked_by_previous_data() {
        let mut client = MockDataServiceClient::new();
        let mut calls = 0u32;
        client.expect_call_procedure().times(2).returning(move |call| {
            calls += 1;
            if calls == 1 {
                Ok(rows(&[1]))
            } else {
                Err(DomainError::remote(call.name(), "HTTP 503"))
            }
        });
        let cache = cache_with(client);

        let query = TestQuery::always_stale("a");
        assert_ok!(cache.fetch_query(&query).await);

        let result = cache.fetch_query(&query).await;
        assert_eq!(
            result.unwrap_err(),
            DomainError::remote("test_rows", "HTTP 503")
        );
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mut client = MockDataServiceClient::new();
        let mut calls = 0u32;
        client.expect_call_procedure().times(2).returning(move |call| {
            calls += 1;
            if calls == 1 {
                Err(DomainError::remote(call.name(), "timeout"))
            } else {
                Ok(rows(&[3]))
            }
        });
        let cache = cache_with(client);

        let query = TestQuery::new("a");
        assert_err!(cache.fetch_query(&query).await);

        let data = cache.fetch_query(&query).await.unwrap().unwrap();
        assert_eq!(data.rows, vec![Row { id: 3 }]);
    }

    #[tokio::test]
    async fn test_zero_rows_is_empty_vec() {
        let mut client = MockDataServiceClient::new();
        client.expect_call_procedure().returning(|_| Ok(vec![]));
        let cache = cache_with(client);

        let data = cache.fetch_query(&TestQuery::new("a")).await.unwrap();
        assert_eq!(data.map(|d| d.rows), Some(vec![]));
    }

    #[tokio::test]
    async fn test_disabled_queries_never_call_remote() {
        let mut client = MockDataServiceClient::new();
        client.expect_call_procedure().never();
        client.expect_select().never();
        let cache = cache_with(client);

        assert!(cache
            .fetch_query(&ContentGapsQuery::for_blog(""))
            .await
            .unwrap()
            .is_none());
        assert!(cache
            .fetch_query(&KeywordRecommendationsQuery::for_post(""))
            .await
            .unwrap()
            .is_none());
        assert!(cache
            .fetch_query(&HybridSearchQuery::new(""))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch_and_notifies() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .times(2)
            .returning(|_| Ok(rows(&[1])));
        let cache = cache_with(client);

        let query = TestQuery::new("a");
        let mut subscription = cache.subscribe_key(query.key());

        assert_ok!(cache.fetch_query(&query).await);
        assert_eq!(
            subscription.next().await.unwrap().kind,
            QueryEventKind::Fetched { rows: 1 }
        );

        cache.invalidate(&query.key()).await;
        assert_eq!(
            subscription.next().await.unwrap().kind,
            QueryEventKind::Invalidated
        );
        assert!(!cache.contains(&query.key()).await);

        assert_ok!(cache.fetch_query(&query).await);
    }

    #[tokio::test]
    async fn test_invalidate_capability_only_touches_that_capability() {
        let mut client = MockDataServiceClient::new();
        client.expect_call_procedure().returning(|_| Ok(rows(&[1])));
        let cache = cache_with(client);

        assert_ok!(cache.fetch_query(&TestQuery::new("a")).await);
        assert_ok!(cache.fetch_query(&TestQuery::new("b")).await);
        assert_ok!(cache.fetch_query(&ContentGapsQuery::for_blog("blog-1")).await);

        let dropped = cache.invalidate_capability("test").await;

        assert_eq!(dropped, 2);
        assert!(!cache.contains(&TestQuery::new("a").key()).await);
        assert!(cache
            .contains(&ContentGapsQuery::for_blog("blog-1").key())
            .await);
    }

    #[tokio::test]
    async fn test_invalidate_during_fetch_is_not_lost() {
        let client = Arc::new(GatedClient::default());
        let cache = QueryCache::new(client.clone());
        let query = TestQuery::new("a");

        let pending = tokio::spawn({
            let cache = cache.clone();
            let query = query.clone();
            async move { cache.fetch_query(&query).await }
        });
        wait_for_call(&client).await;

        let mut subscription = cache.subscribe_key(query.key());
        assert_eq!(cache.invalidate_capability("test").await, 1);
        assert_eq!(
            subscription.next().await.unwrap().kind,
            QueryEventKind::Invalidated
        );
        client.gate.notify_one();

        // the caller that started before the invalidation still gets its rows
        let old = pending.await.unwrap().unwrap().unwrap();
        assert_eq!(old.rows, vec![Row { id: 1 }]);

        let next = cache.fetch_query(&query).await.unwrap().unwrap();
        assert_eq!(next.rows, vec![Row { id: 2 }]);
        assert!(!next.is_stale);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_key_during_fetch_is_not_lost() {
        let client = Arc::new(GatedClient::default());
        let cache = QueryCache::new(client.clone());
        let query = TestQuery::new("a");

        let pending = tokio::spawn({
            let cache = cache.clone();
            let query = query.clone();
            async move { cache.fetch_query(&query).await }
        });
        wait_for_call(&client).await;

        cache.invalidate(&query.key()).await;
        client.gate.notify_one();
        assert_ok!(pending.await.unwrap());

        let next = cache.fetch_query(&query).await.unwrap().unwrap();
        assert_eq!(next.rows, vec![Row { id: 2 }]);
    }

    #[tokio::test]
    async fn test_serve_stale_returns_flagged_rows_and_refreshes() {
        let mut client = MockDataServiceClient::new();
        let mut calls = 0u32;
        client.expect_call_procedure().times(2).returning(move |_| {
            calls += 1;
            Ok(rows(&[calls]))
        });
        let cache = QueryCache::with_config(
            Arc::new(client),
            QueryCacheConfig::default().with_stale_policy(StalePolicy::ServeStale),
        );

        let query = TestQuery::always_stale("a");
        let mut subscription = cache.subscribe_key(query.key());

        let first = cache.fetch_query(&query).await.unwrap().unwrap();
        assert_eq!(first.rows, vec![Row { id: 1 }]);
        assert!(subscription.next().await.is_some());

        let second = cache.fetch_query(&query).await.unwrap().unwrap();
        assert_eq!(second.rows, vec![Row { id: 1 }]);
        assert!(second.is_stale);

        // background refresh lands
        assert_eq!(
            subscription.next().await.unwrap().kind,
            QueryEventKind::Fetched { rows: 1 }
        );
    }

    #[tokio::test]
    async fn test_undecodable_rows_are_errors() {
        let mut client = MockDataServiceClient::new();
        client
            .expect_call_procedure()
            .returning(|_| Ok(vec![serde_json::json!({"id": "not a number"})]));
        let cache = cache_with(client);

        let result = cache.fetch_query(&TestQuery::new("a")).await;
        assert!(matches!(result, Err(DomainError::Decode { .. })));
    }
}
