use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;

use crate::config::Config;
use crate::record::Keyed;
use crate::route;
use crate::shard::{Shard, ShardSet};
use crate::storage::{Engine, Table};
use crate::util::{Result, RouteError, TableError};

/// Routes keyed records across a fixed set of shards and fans operations
/// out to the per-shard storage tables behind them.
///
/// Every record-taking operation derives the target shard from the
/// record's key, so the same key always lands on, and is read from, the
/// same shard. Batch writes run one bulk operation per participating
/// shard concurrently; reads gather shard by shard in ascending index
/// order. There is no coordination beyond that: a failed shard does not
/// roll back or cancel its siblings.
#[derive(Debug)]
pub struct ShardingService<T> {
    shards: ShardSet<T>,
}

impl<T: Table> ShardingService<T> {
    /// Opens the shard topology described by `config` against `engine`.
    ///
    /// Fails with [`ConfigError::ShardCount`](crate::util::ConfigError)
    /// before creating anything if the count is zero.
    pub fn new<E>(engine: &E, config: Config) -> Result<Self>
    where
        E: Engine<Table = T>,
    {
        let shards = ShardSet::open(engine, &config)?;
        Ok(Self { shards })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shards(&self) -> &ShardSet<T> {
        &self.shards
    }

    fn route_record(&self, record: &T::Record) -> Result<usize> {
        let key = record.key().ok_or(RouteError::MissingKey)?;
        route::shard_index(key, self.shards.len())
    }

    /// Groups `records` by target shard without touching storage.
    ///
    /// Ascending shard order, input order kept within each group, empty
    /// groups dropped. Feeding one group to [`put_prepared`] or
    /// [`add_prepared`] is the two-step form of [`put_batch`].
    ///
    /// [`put_prepared`]: ShardingService::put_prepared
    /// [`add_prepared`]: ShardingService::add_prepared
    /// [`put_batch`]: ShardingService::put_batch
    pub fn partition(&self, records: Vec<T::Record>) -> Result<Vec<Vec<T::Record>>> {
        route::partition(records, self.shards.len())
    }

    /// Inserts a record that must not already exist.
    ///
    /// An existing key fails with
    /// [`TableError::DuplicateKey`](crate::util::TableError).
    pub async fn insert(&self, record: T::Record, table: &str) -> Result<()> {
        let index = self.route_record(&record)?;
        self.shards.shard(index).table(table)?.add(record).await
    }

    /// Inserts or replaces a record. Idempotent.
    pub async fn put(&self, record: T::Record, table: &str) -> Result<()> {
        let index = self.route_record(&record)?;
        self.shards.shard(index).table(table)?.put(record).await
    }

    /// Reads the record stored under `key`. An absent key is `Ok(None)`.
    pub async fn get(&self, key: &str, table: &str) -> Result<Option<T::Record>> {
        let index = route::shard_index(key, self.shards.len())?;
        self.shards.shard(index).table(table)?.get(key).await
    }

    /// Removes the record stored under `key`. Absent keys are a no-op.
    pub async fn delete(&self, key: &str, table: &str) -> Result<()> {
        let index = route::shard_index(key, self.shards.len())?;
        self.shards.shard(index).table(table)?.delete(key).await
    }

    /// Replaces the record stored under `record`'s own key and returns the
    /// applied record.
    ///
    /// Updating a key with no stored record fails with
    /// [`TableError::NotFound`](crate::util::TableError) and leaves
    /// storage untouched.
    pub async fn update(&self, record: T::Record, table: &str) -> Result<T::Record> {
        let key = match record.key() {
            Some(key) => key.to_owned(),
            None => return Err(RouteError::MissingKey.into()),
        };
        let index = route::shard_index(&key, self.shards.len())?;
        let handle = self.shards.shard(index).table(table)?;
        if handle.update(&key, record.clone()).await? {
            Ok(record)
        } else {
            tracing::debug!(key = key.as_str(), table, "update target not found");
            Err(TableError::NotFound(key).into())
        }
    }

    /// Upserts a batch, one concurrent `bulk_put` per participating shard.
    ///
    /// Partitioning and table resolution happen before anything is
    /// dispatched, so an unroutable record or a bad table name writes
    /// nothing. Once dispatched, every per-shard operation is awaited;
    /// on failure the error from the lowest shard index is returned and
    /// writes that succeeded on other shards stay applied.
    pub async fn put_batch(&self, records: Vec<T::Record>, table: &str) -> Result<()> {
        let groups = route::partition_indexed(records, self.shards.len())?;
        if groups.is_empty() {
            return Ok(());
        }
        let mut dispatches = Vec::with_capacity(groups.len());
        for (index, group) in groups {
            let handle = self.shards.shard(index).table(table)?;
            dispatches.push(async move { handle.bulk_put(group).await });
        }
        tracing::debug!(table, shards = dispatches.len(), "dispatching batch put");
        for result in join_all(dispatches).await {
            result?;
        }
        Ok(())
    }

    /// Upserts a pre-partitioned batch onto the single shard it routes to.
    ///
    /// The shard comes from the first record's key; every other record is
    /// checked against it and a mismatch fails with
    /// [`RouteError::CrossShard`](crate::util::RouteError) before anything
    /// is written. An empty batch is an Ok no-op.
    pub async fn put_prepared(&self, records: Vec<T::Record>, table: &str) -> Result<()> {
        let index = match self.prepared_index(&records)? {
            Some(index) => index,
            None => return Ok(()),
        };
        let handle = self.shards.shard(index).table(table)?;
        handle.bulk_put(records).await
    }

    /// Duplicate-rejecting variant of [`put_prepared`], backed by the
    /// collaborator's `bulk_add`.
    ///
    /// [`put_prepared`]: ShardingService::put_prepared
    pub async fn add_prepared(&self, records: Vec<T::Record>, table: &str) -> Result<()> {
        let index = match self.prepared_index(&records)? {
            Some(index) => index,
            None => return Ok(()),
        };
        let handle = self.shards.shard(index).table(table)?;
        handle.bulk_add(records).await
    }

    fn prepared_index(&self, records: &[T::Record]) -> Result<Option<usize>> {
        let mut target = None;
        for record in records {
            let index = self.route_record(record)?;
            match target {
                None => target = Some(index),
                Some(expected) if expected != index => {
                    return Err(RouteError::CrossShard {
                        expected,
                        found: index,
                    }
                    .into());
                }
                Some(_) => {}
            }
        }
        Ok(target)
    }

    /// Scans the named table on every shard and concatenates the results
    /// in ascending shard order.
    pub async fn get_all(&self, table: &str) -> Result<Vec<T::Record>> {
        let mut records = Vec::new();
        for shard in self.shards.iter() {
            let mut rows = shard.table(table)?.scan().await?;
            records.append(&mut rows);
        }
        Ok(records)
    }

    /// Runs `query` against shards one at a time in ascending order and
    /// concatenates the hits.
    ///
    /// The query receives the whole shard, so it may consult any of its
    /// tables. With a `limit`, visiting stops as soon as the gathered hits
    /// reach it and the result is truncated to exactly `limit`; shards
    /// past that point are never queried.
    pub async fn search<F, Fut>(&self, query: F, limit: Option<usize>) -> Result<Vec<T::Record>>
    where
        F: Fn(Arc<Shard<T>>) -> Fut,
        Fut: Future<Output = Result<Vec<T::Record>>>,
    {
        let mut records = Vec::new();
        for shard in self.shards.iter() {
            if let Some(limit) = limit {
                if records.len() >= limit {
                    break;
                }
            }
            let mut hits = query(shard.clone()).await?;
            records.append(&mut hits);
        }
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Clears every table on every shard concurrently.
    ///
    /// All clears are awaited before this returns, and the first error in
    /// shard order is surfaced after the join.
    pub async fn clear_all(&self) -> Result<()> {
        let mut clears = Vec::new();
        for shard in self.shards.iter() {
            for table in shard.tables() {
                let handle = table.clone();
                clears.push(async move { handle.clear().await });
            }
        }
        tracing::debug!(tables = clears.len(), "clearing all shards");
        for result in join_all(clears).await {
            result?;
        }
        Ok(())
    }
}
