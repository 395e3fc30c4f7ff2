use catalog_core::{cache_key, CatalogError, ReadSource, StoreError, StoreRole};
use catalog_test_utils::{Fixture, InMemoryStore, ScriptedCache};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn first_read_hits_database_then_cache() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);
    let repo = fx.repository();

    let first = repo.get_by_id(widget.id).await.unwrap().unwrap();
    assert_eq!(first.source, ReadSource::Database);
    assert_eq!(first.data, widget);

    let second = repo.get_by_id(widget.id).await.unwrap().unwrap();
    assert_eq!(second.source, ReadSource::Cache);
    assert_eq!(second.data, first.data);
    assert_eq!(
        serde_json::to_vec(&second.data).unwrap(),
        serde_json::to_vec(&first.data).unwrap()
    );

    // Only the first read reached a store
    assert_eq!(fx.replica.query_count(), 1);
    assert_eq!(fx.primary.query_count(), 0);
}

#[tokio::test]
async fn missing_row_is_not_found_with_or_without_cache() {
    let fx = Fixture::new().await;
    assert!(fx.repository().get_by_id(999).await.unwrap().is_none());
    assert!(fx.cache.peek(&cache_key(999)).is_none());

    let fx = Fixture::with_cache(ScriptedCache::unreachable()).await;
    assert!(fx.repository().get_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
async fn fill_uses_sixty_second_ttl() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);

    fx.repository().get_by_id(widget.id).await.unwrap();

    let ttl = fx.cache.remaining_ttl(&cache_key(widget.id)).unwrap();
    assert!(ttl <= Duration::from_secs(60));
    assert!(ttl > Duration::from_secs(55));

    let cached: catalog_core::Product =
        serde_json::from_slice(&fx.cache.peek(&cache_key(widget.id)).unwrap()).unwrap();
    assert_eq!(cached, widget);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_reads_through_again() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);
    let repo = fx.repository();

    repo.get_by_id(widget.id).await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;

    let read = repo.get_by_id(widget.id).await.unwrap().unwrap();
    assert_eq!(read.source, ReadSource::Database);
    assert_eq!(fx.replica.query_count(), 2);
}

#[tokio::test]
async fn replica_failure_falls_back_to_primary() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);
    fx.replica.set_failing(true);

    let read = fx.repository().get_by_id(widget.id).await.unwrap().unwrap();

    assert_eq!(read.source, ReadSource::Database);
    assert_eq!(read.data, widget);
    assert_eq!(fx.replica.query_count(), 1);
    assert_eq!(fx.primary.query_count(), 1);
    assert!(fx.cache.peek(&cache_key(widget.id)).is_some());
}

#[tokio::test]
async fn replica_answering_empty_does_not_consult_primary() {
    let primary = Arc::new(InMemoryStore::primary());
    let replica = Arc::new(InMemoryStore::detached(StoreRole::Replica));
    let widget = primary.seed("Widget", 500);
    let fx = Fixture::build(ScriptedCache::new(), primary, replica).await;

    assert!(fx.repository().get_by_id(widget.id).await.unwrap().is_none());
    assert_eq!(fx.primary.query_count(), 0);
}

#[tokio::test]
async fn both_stores_failing_is_a_hard_error() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);
    fx.replica.set_failing(true);
    fx.primary.set_failing(true);

    let err = fx.repository().get_by_id(widget.id).await.unwrap_err();

    assert!(matches!(
        err,
        CatalogError::PrimaryUnavailable(StoreError::Connectivity(_))
    ));
    assert_eq!(fx.primary.query_count(), 1);
    assert!(fx.cache.peek(&cache_key(widget.id)).is_none());
}

#[tokio::test]
async fn cached_entry_served_even_when_stores_are_down() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);
    let repo = fx.repository();
    repo.get_by_id(widget.id).await.unwrap();

    fx.replica.set_failing(true);
    fx.primary.set_failing(true);

    let read = repo.get_by_id(widget.id).await.unwrap().unwrap();
    assert_eq!(read.source, ReadSource::Cache);
}

#[tokio::test]
async fn corrupt_cache_entry_is_treated_as_miss() {
    let fx = Fixture::new().await;
    let widget = fx.primary.seed("Widget", 500);
    let key = cache_key(widget.id);
    fx.cache.put_raw(&key, b"{not json", Duration::from_secs(60));

    let read = fx.repository().get_by_id(widget.id).await.unwrap().unwrap();

    assert_eq!(read.source, ReadSource::Database);
    assert_eq!(read.data, widget);
    // The fill replaced the corrupt value
    let repaired: catalog_core::Product =
        serde_json::from_slice(&fx.cache.peek(&key).unwrap()).unwrap();
    assert_eq!(repaired, widget);
}

#[tokio::test]
async fn unreachable_cache_always_reads_database() {
    let fx = Fixture::with_cache(ScriptedCache::unreachable()).await;
    let widget = fx.primary.seed("Widget", 500);
    let repo = fx.repository();

    for _ in 0..3 {
        let read = repo.get_by_id(widget.id).await.unwrap().unwrap();
        assert_eq!(read.source, ReadSource::Database);
        assert_eq!(read.data, widget);
    }
    assert_eq!(fx.replica.query_count(), 3);
}
