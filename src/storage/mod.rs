use crate::record::Keyed;
use crate::util::Result;
use async_trait::async_trait;

mod in_mem;
pub use in_mem::{InMemEngine, InMemTable};

/// One named table on one shard, as provided by the storage engine.
///
/// The routing layer drives this contract and nothing else; durability,
/// indexing and scan order are whatever the engine gives. Engine-internal
/// failures surface as [`Error::Storage`](crate::util::Error) and flow
/// through the routing layer unchanged.
#[async_trait]
pub trait Table: Send + Sync {
    type Record: Keyed + Clone + Send;

    /// Point lookup; a missing key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<Self::Record>>;
    /// Insert-if-absent; an existing key fails with `DuplicateKey`.
    async fn add(&self, record: Self::Record) -> Result<()>;
    /// Upsert.
    async fn put(&self, record: Self::Record) -> Result<()>;
    /// Removes if present; an absent key is an Ok no-op.
    async fn delete(&self, key: &str) -> Result<()>;
    /// Applies `patch` under `key` when the key exists; returns whether
    /// it did. Never creates the key.
    async fn update(&self, key: &str, patch: Self::Record) -> Result<bool>;
    /// Bulk upsert of records already known to belong to this shard.
    async fn bulk_put(&self, records: Vec<Self::Record>) -> Result<()>;
    /// Bulk insert-if-absent; any existing key fails the call with
    /// `DuplicateKey`. How much of the batch was applied at that point is
    /// engine defined.
    async fn bulk_add(&self, records: Vec<Self::Record>) -> Result<()>;
    /// Full scan; order is storage defined.
    async fn scan(&self) -> Result<Vec<Self::Record>>;
    /// Removes every record in the table.
    async fn clear(&self) -> Result<()>;
}

/// Factory for per-shard tables, called once per `(shard, table)` pair
/// during service construction.
///
/// `(shard, table)` is a stable storage address: an engine that keeps data
/// must hand back the same underlying table when the pair is created
/// again, which is what lets a restarted service reattach to its shards.
/// `spec` is the schema entry for the table, passed through verbatim and
/// never interpreted by the routing layer.
pub trait Engine: Send + Sync {
    type Table: Table;

    fn create_table(&self, shard: &str, table: &str, spec: &str) -> Result<Self::Table>;
}
