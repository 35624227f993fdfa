//! Warehouse query collaborator and its result cache.
//!
//! The agent's SQL is shown to the user, and the same text is often re-run to
//! display the result table. Results are cached by exact query text for five
//! minutes; the cache is shared across sessions and read-mostly.

use crate::Result;
use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_QUERY_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_QUERY_CAPACITY: usize = 256;

/// Tabular query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can execute SQL against the warehouse.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, sql: &str) -> Result<QueryTable>;
}

struct CachedTable {
    table: QueryTable,
    stored_at: Instant,
}

/// TTL + LRU cache in front of a [`QueryRunner`].
///
/// Keys are the exact SQL text; whitespace differences are distinct entries.
/// Failed queries are never cached.
pub struct CachedQueryRunner<R> {
    inner: R,
    ttl: Duration,
    entries: Mutex<LruCache<String, CachedTable>>,
}

impl<R: QueryRunner> CachedQueryRunner<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, DEFAULT_QUERY_TTL, DEFAULT_QUERY_CAPACITY)
    }

    pub fn with_limits(inner: R, ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn lookup(&self, sql: &str) -> Option<QueryTable> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let fresh = entries.get(sql).map(|e| e.stored_at.elapsed() <= self.ttl)?;
        if fresh {
            entries.get(sql).map(|e| e.table.clone())
        } else {
            entries.pop(sql);
            None
        }
    }

    fn store(&self, sql: &str, table: &QueryTable) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(
            sql.to_string(),
            CachedTable {
                table: table.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl<R: QueryRunner> QueryRunner for CachedQueryRunner<R> {
    async fn run(&self, sql: &str) -> Result<QueryTable> {
        if let Some(table) = self.lookup(sql) {
            debug!(rows = table.rows.len(), "query cache hit");
            return Ok(table);
        }
        let table = self.inner.run(sql).await?;
        self.store(sql, &table);
        Ok(table)
    }
}
