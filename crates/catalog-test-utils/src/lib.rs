//! Catalog Test Utilities
//!
//! Fakes for the two ports the repository consumes:
//! - [`InMemoryStore`]: a `products` table with failure injection
//! - [`ScriptedCache`]: a TTL key-value backend that can be taken down

pub use catalog_core::{
    cache_key, CacheBackend, CacheError, CacheFacade, Product, ProductFields, ProductStatement,
    ReconnectPolicy, StoreConnector, StoreError, StoreResult, StoreRole,
};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// STORE
// ============================================================================

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Product>,
    next_id: i64,
}

/// In-memory product table implementing [`StoreConnector`].
///
/// A replica built with [`InMemoryStore::replica_of`] shares its primary's
/// table (zero lag); [`InMemoryStore::detached`] gives it its own, which
/// lets tests model a lagging replica.
pub struct InMemoryStore {
    role: StoreRole,
    table: Arc<Mutex<Table>>,
    failing: AtomicBool,
    queries: AtomicUsize,
    executes: AtomicUsize,
}

impl InMemoryStore {
    pub fn primary() -> Self {
        Self::detached(StoreRole::Primary)
    }

    pub fn detached(role: StoreRole) -> Self {
        Self {
            role,
            table: Arc::new(Mutex::new(Table::default())),
            failing: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
            executes: AtomicUsize::new(0),
        }
    }

    pub fn replica_of(primary: &InMemoryStore) -> Self {
        Self {
            role: StoreRole::Replica,
            table: primary.table.clone(),
            failing: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
            executes: AtomicUsize::new(0),
        }
    }

    /// Insert a row directly, bypassing counters and failure injection.
    pub fn seed(&self, name: &str, price_cents: i64) -> Product {
        let mut table = self.table.lock().unwrap();
        insert(&mut table, ProductFields::new(name, price_cents))
    }

    /// Overwrite a row directly, keeping its id.
    pub fn put(&self, product: Product) {
        let mut table = self.table.lock().unwrap();
        table.next_id = table.next_id.max(product.id);
        table.rows.insert(product.id, product);
    }

    pub fn row(&self, id: i64) -> Option<Product> {
        self.table.lock().unwrap().rows.get(&id).cloned()
    }

    /// Make every subsequent call fail with a connectivity error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn execute_count(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Connectivity(format!(
                "{} store: connection refused",
                self.role
            )))
        } else {
            Ok(())
        }
    }

    fn run(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>> {
        let mut table = self.table.lock().unwrap();

        match statement {
            ProductStatement::SelectById { id } => {
                Ok(table.rows.get(id).cloned().into_iter().collect())
            }
            ProductStatement::Insert { fields } => Ok(vec![insert(&mut table, fields.clone())]),
            ProductStatement::Update { id, fields } => Ok(table
                .rows
                .get_mut(id)
                .map(|row| {
                    row.name = fields.name.clone();
                    row.price_cents = fields.price_cents;
                    row.updated_at = Utc::now();
                    row.clone()
                })
                .into_iter()
                .collect()),
        }
    }
}

fn insert(table: &mut Table, fields: ProductFields) -> Product {
    table.next_id += 1;
    let product = Product {
        id: table.next_id,
        name: fields.name,
        price_cents: fields.price_cents,
        updated_at: Utc::now(),
    };
    table.rows.insert(product.id, product.clone());
    product
}

#[async_trait]
impl StoreConnector for InMemoryStore {
    fn role(&self) -> StoreRole {
        self.role
    }

    async fn query(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if statement.is_write() {
            return Err(StoreError::Query("write statement passed to query".into()));
        }
        self.run(statement)
    }

    async fn execute(&self, statement: &ProductStatement) -> StoreResult<Vec<Product>> {
        self.executes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.role == StoreRole::Replica && statement.is_write() {
            return Err(StoreError::Query(
                "cannot execute in a read-only transaction".into(),
            ));
        }
        self.run(statement)
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// In-memory [`CacheBackend`] that can be switched off.
///
/// Expiry uses `tokio::time`, so paused-clock tests control it.
#[derive(Default)]
pub struct ScriptedCache {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
    down: AtomicBool,
    pings: AtomicUsize,
}

impl ScriptedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that refuses every connection.
    pub fn unreachable() -> Self {
        let cache = Self::default();
        cache.set_down(true);
        cache
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Store raw bytes under `key`, bypassing the facade.
    pub fn put_raw(&self, key: &str, value: &[u8], ttl: Duration) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), Instant::now() + ttl));
    }

    /// Live (unexpired) value for `key`.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires)| Instant::now() < *expires)
            .map(|(value, _)| value.clone())
    }

    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .map(|(_, expires)| expires.saturating_duration_since(Instant::now()))
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheError::Connection("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheBackend for ScriptedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check()?;
        Ok(self.peek(key))
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.put_raw(key, value, ttl);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A wired-up repository over fakes, with handles to each fake.
pub struct Fixture {
    pub cache: Arc<ScriptedCache>,
    pub facade: Arc<CacheFacade>,
    pub primary: Arc<InMemoryStore>,
    pub replica: Arc<InMemoryStore>,
}

impl Fixture {
    /// Primary and zero-lag replica behind a reachable cache.
    pub async fn new() -> Self {
        Self::with_cache(ScriptedCache::new()).await
    }

    pub async fn with_cache(cache: ScriptedCache) -> Self {
        let primary = Arc::new(InMemoryStore::primary());
        let replica = Arc::new(InMemoryStore::replica_of(&primary));
        Self::build(cache, primary, replica).await
    }

    pub async fn build(
        cache: ScriptedCache,
        primary: Arc<InMemoryStore>,
        replica: Arc<InMemoryStore>,
    ) -> Self {
        let cache = Arc::new(cache);
        let facade =
            Arc::new(CacheFacade::connect(cache.clone(), ReconnectPolicy::default()).await);

        Self {
            cache,
            facade,
            primary,
            replica,
        }
    }

    pub fn repository(&self) -> catalog_core::ProductRepository {
        catalog_core::ProductRepository::new(
            self.facade.clone(),
            self.primary.clone(),
            self.replica.clone(),
        )
    }
}
