//! Integration Tests for the Composed Store Stack
//!
//! Service -> resilience -> read-through cache -> engine, exercised the way
//! `main` wires it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use greeting_store::{
    cache::{CacheStore, CachedStore},
    models::{ListQuery, OrderBy, Record},
    resilience::{CircuitState, ResiliencePolicy, ResilientStore},
    store::{DocumentStore, MemoryStore, SqliteStore},
    RecordService, RecordStore, Result, StoreError,
};
use tokio::sync::RwLock;

// == Helpers ==

/// Engine double that counts every invocation and can be switched to fail.
#[derive(Default)]
struct CountingEngine {
    inner: MemoryStore,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingEngine {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("engine unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CountingEngine {
    async fn get_latest(&self) -> Result<Option<Record>> {
        self.enter()?;
        self.inner.get_latest().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.enter()?;
        self.inner.get_by_id(id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        self.enter()?;
        self.inner.list(query).await
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        self.enter()?;
        self.inner.list_all().await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        self.enter()?;
        self.inner.save(record).await
    }
}

fn layered<S: RecordStore>(
    engine: S,
    invalidate_listings: bool,
) -> Arc<ResilientStore<CachedStore<S>>> {
    let cache = Arc::new(RwLock::new(CacheStore::new(1000, Duration::from_secs(300))));
    let cached = CachedStore::new(engine, cache).with_listing_invalidation(invalidate_listings);
    Arc::new(ResilientStore::new(cached, ResiliencePolicy::default()))
}

fn compose<S: RecordStore + 'static>(engine: S, invalidate_listings: bool) -> RecordService {
    RecordService::new(layered(engine, invalidate_listings))
}

fn counted() -> (RecordService, Arc<CountingEngine>) {
    let engine = Arc::new(CountingEngine::default());
    (compose(engine.clone(), false), engine)
}

fn messages(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.message.as_str()).collect()
}

// == Cache Behaviour ==

#[tokio::test(start_paused = true)]
async fn test_repeated_lookup_reaches_engine_once() {
    let (service, engine) = counted();
    let saved = service.create("hello").await.unwrap();
    let before = engine.calls();

    let first = service.get_by_id(saved.id).await.unwrap();
    let second = service.get_by_id(saved.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.calls() - before, 1);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_reaches_engine_again_after_ttl() {
    let (service, engine) = counted();
    let saved = service.create("hello").await.unwrap();
    service.get_by_id(saved.id).await.unwrap();
    let before = engine.calls();

    tokio::time::advance(Duration::from_secs(301)).await;
    service.get_by_id(saved.id).await.unwrap();

    assert_eq!(engine.calls() - before, 1);
}

#[tokio::test(start_paused = true)]
async fn test_save_invalidates_latest() {
    let (service, engine) = counted();
    service.create("first").await.unwrap();
    assert_eq!(service.get_latest().await.unwrap().unwrap().message, "first");

    service.create("second").await.unwrap();
    let before = engine.calls();

    assert_eq!(service.get_latest().await.unwrap().unwrap().message, "second");
    assert_eq!(engine.calls() - before, 1);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_after_save_is_not_stale() {
    let (service, engine) = counted();
    service.create("first").await.unwrap();

    // Not-found results are not cached
    assert!(service.get_by_id(2).await.unwrap().is_none());

    let saved = service.create("second").await.unwrap();
    assert_eq!(saved.id, 2);
    let before = engine.calls();

    let found = service.get_by_id(2).await.unwrap().unwrap();
    assert_eq!(found.message, "second");
    assert_eq!(engine.calls() - before, 1);
}

#[tokio::test(start_paused = true)]
async fn test_listings_stay_cached_across_saves_by_default() {
    let (service, _) = counted();
    service.create("first").await.unwrap();
    assert_eq!(service.list_all().await.unwrap().len(), 1);

    service.create("second").await.unwrap();

    assert_eq!(service.list_all().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_listing_invalidation_can_be_enabled() {
    let service = compose(MemoryStore::new(), true);
    service.create("first").await.unwrap();
    let query = ListQuery::default();
    assert_eq!(service.list(query.clone()).await.unwrap().items.len(), 1);
    assert_eq!(service.list_all().await.unwrap().len(), 1);

    service.create("second").await.unwrap();

    assert_eq!(service.list(query).await.unwrap().items.len(), 2);
    assert_eq!(service.list_all().await.unwrap().len(), 2);
}

// == Resilience Behaviour ==

#[tokio::test(start_paused = true)]
async fn test_failing_engine_is_tried_three_times() {
    let (service, engine) = counted();
    engine.set_failing(true);

    let err = service.get_by_id(1).await.unwrap_err();

    assert!(matches!(err, StoreError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(engine.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_open_circuit_fails_fast() {
    let (service, engine) = counted();
    engine.set_failing(true);

    service.get_latest().await.unwrap_err();
    service.list_all().await.unwrap_err();
    let calls = engine.calls();

    let err = service.get_by_id(1).await.unwrap_err();
    assert!(matches!(err, StoreError::CircuitOpen));
    assert_eq!(engine.calls(), calls);

    tokio::time::advance(Duration::from_secs(5)).await;
    assert!(matches!(
        service.create("still open").await,
        Err(StoreError::CircuitOpen)
    ));
    assert_eq!(engine.calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_circuit_recovers_after_break() {
    let (service, engine) = counted();
    engine.set_failing(true);
    service.get_latest().await.unwrap_err();
    service.get_latest().await.unwrap_err();

    engine.set_failing(false);
    tokio::time::advance(Duration::from_secs(10)).await;

    let saved = service.create("back online").await.unwrap();
    assert!(saved.id > 0);
}

#[tokio::test(start_paused = true)]
async fn test_validation_failures_never_reach_engine() {
    let (service, engine) = counted();

    assert!(service.save(None).await.is_err());
    assert!(service.create("").await.is_err());
    assert!(service.create("y".repeat(201)).await.is_err());
    assert!(service.get_by_id(0).await.is_err());

    assert_eq!(engine.calls(), 0);
}

// == Engine Semantics ==

async fn assert_listing_semantics(service: RecordService) {
    assert!(service.get_latest().await.unwrap().is_none());

    for message in ["B", "A", "hello world", "HELLO again", "other"] {
        service.create(message).await.unwrap();
    }

    let page = service
        .list(ListQuery::new(1, 2, OrderBy::CreatedAt, true))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);

    let filtered = service
        .list(ListQuery::new(1, 10, OrderBy::Message, false).with_filter("hello"))
        .await
        .unwrap();
    assert_eq!(messages(&filtered.items), vec!["HELLO again", "hello world"]);

    let ascending = service
        .list(ListQuery::new(1, 2, OrderBy::Message, false))
        .await
        .unwrap();
    assert_eq!(messages(&ascending.items), vec!["A", "B"]);

    let descending = service
        .list(ListQuery::new(1, 10, OrderBy::Message, true).with_filter("o"))
        .await
        .unwrap();
    assert_eq!(
        messages(&descending.items),
        vec!["other", "hello world", "HELLO again"]
    );

    let invalid = service
        .list(ListQuery::new(0, 10, OrderBy::Message, true))
        .await
        .unwrap();
    assert!(invalid.items.is_empty());

    let latest = service.get_latest().await.unwrap().unwrap();
    assert_eq!(latest.message, "other");

    let all = service.list_all().await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].message, "other");
}

#[tokio::test]
async fn test_memory_engine_semantics() {
    assert_listing_semantics(compose(MemoryStore::new(), false)).await;
}

#[tokio::test]
async fn test_sqlite_engine_semantics() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_listing_semantics(compose(store, false)).await;
}

#[tokio::test]
async fn test_document_engine_semantics() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path(), "records").await.unwrap();
    assert_listing_semantics(compose(store, false)).await;
}

#[tokio::test]
async fn test_round_trip_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");
    let path = path.to_str().unwrap();

    let saved = {
        let service = compose(SqliteStore::open(path).unwrap(), false);
        service.create("persisted").await.unwrap()
    };

    let service = compose(SqliteStore::open(path).unwrap(), false);
    let found = service.get_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(found, saved);
}

// == Concurrency ==

const WRITERS: usize = 32;

async fn create_concurrently(service: &RecordService) -> Vec<i64> {
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.create(format!("writer {i}")).await })
        })
        .collect();

    let mut ids = Vec::with_capacity(WRITERS);
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids
}

fn assert_unique(ids: &[i64]) {
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
    assert!(ids.iter().all(|id| *id > 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_and_lookups() {
    let (service, engine) = counted();

    let ids = create_concurrently(&service).await;
    assert_unique(&ids);

    // Every new id misses the cache exactly once.
    let before = engine.calls();
    let lookups: Vec<_> = ids
        .iter()
        .map(|&id| {
            let service = service.clone();
            tokio::spawn(async move { service.get_by_id(id).await })
        })
        .collect();
    for (handle, id) in lookups.into_iter().zip(&ids) {
        let found = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(found.id, *id);
    }
    assert_eq!(engine.calls() - before, WRITERS);

    let before = engine.calls();
    for id in &ids {
        service.get_by_id(*id).await.unwrap().unwrap();
    }
    assert_eq!(engine.calls(), before);

    assert_eq!(service.list_all().await.unwrap().len(), WRITERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_on_persistent_engines() {
    let dir = tempfile::tempdir().unwrap();

    let sqlite = compose(
        SqliteStore::open(dir.path().join("records.db").to_str().unwrap()).unwrap(),
        false,
    );
    assert_unique(&create_concurrently(&sqlite).await);

    let document = compose(
        DocumentStore::open(dir.path(), "records").await.unwrap(),
        false,
    );
    assert_unique(&create_concurrently(&document).await);

    let reopened = DocumentStore::open(dir.path(), "records").await.unwrap();
    let on_disk: Vec<i64> = reopened.list_all().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(on_disk.len(), WRITERS);
    assert_unique(&on_disk);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_open_circuit_once() {
    let engine = Arc::new(CountingEngine::default());
    let store = layered(engine.clone(), false);
    let service = RecordService::new(store.clone());
    engine.set_failing(true);

    let callers = 8;
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get_latest().await })
        })
        .collect();

    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Err(StoreError::RetriesExhausted { attempts: 3, .. }) => exhausted += 1,
            Err(StoreError::CircuitOpen) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    assert!(exhausted >= 2, "only {exhausted} calls reached the engine");
    assert_eq!(engine.calls(), exhausted * 3);
    assert_eq!(store.circuit_state(), CircuitState::Open);

    let calls = engine.calls();
    assert!(matches!(
        service.get_by_id(1).await,
        Err(StoreError::CircuitOpen)
    ));
    assert_eq!(engine.calls(), calls);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_successes_keep_circuit_closed() {
    let engine = Arc::new(CountingEngine::default());
    let store = layered(engine.clone(), false);
    let service = RecordService::new(store.clone());

    let ids = create_concurrently(&service).await;

    assert_unique(&ids);
    assert_eq!(engine.calls(), WRITERS);
    assert_eq!(store.circuit_state(), CircuitState::Closed);
}
