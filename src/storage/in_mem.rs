use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::record::Keyed;
use crate::storage::{Engine, Table};
use crate::util::{Result, RouteError, TableError};

type Rows<R> = Arc<RwLock<BTreeMap<String, R>>>;

/// Non-durable reference engine keeping rows in process memory.
///
/// Tables are addressed by `(shard, table)` in a registry, so creating the
/// same pair again hands back a handle onto the same rows. That mirrors
/// what a durable engine does across restarts and is what makes the
/// stable-naming contract observable in tests.
#[derive(Debug)]
pub struct InMemEngine<R> {
    registry: Mutex<BTreeMap<(String, String), Rows<R>>>,
}

impl<R> InMemEngine<R> {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<R> Default for InMemEngine<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Engine for InMemEngine<R>
where
    R: Keyed + Clone + Send + Sync,
{
    type Table = InMemTable<R>;

    fn create_table(&self, shard: &str, table: &str, spec: &str) -> Result<Self::Table> {
        let mut registry = self.registry.lock();
        let rows = registry
            .entry((shard.to_owned(), table.to_owned()))
            .or_default()
            .clone();
        Ok(InMemTable {
            shard: shard.to_owned(),
            name: table.to_owned(),
            spec: spec.to_owned(),
            rows,
        })
    }
}

/// Handle onto one shard's rows for one named table.
#[derive(Debug)]
pub struct InMemTable<R> {
    shard: String,
    name: String,
    spec: String,
    rows: Rows<R>,
}

impl<R> InMemTable<R> {
    pub fn shard(&self) -> &str {
        &self.shard
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema entry this table was created with, verbatim.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

fn key_of<R: Keyed>(record: &R) -> Result<String> {
    match record.key() {
        Some(key) if !key.is_empty() => Ok(key.to_owned()),
        _ => Err(RouteError::MissingKey.into()),
    }
}

#[async_trait]
impl<R> Table for InMemTable<R>
where
    R: Keyed + Clone + Send + Sync,
{
    type Record = R;

    async fn get(&self, key: &str) -> Result<Option<R>> {
        Ok(self.rows.read().get(key).cloned())
    }

    async fn add(&self, record: R) -> Result<()> {
        let key = key_of(&record)?;
        let mut rows = self.rows.write();
        if rows.contains_key(&key) {
            return Err(TableError::DuplicateKey(key).into());
        }
        rows.insert(key, record);
        Ok(())
    }

    async fn put(&self, record: R) -> Result<()> {
        let key = key_of(&record)?;
        self.rows.write().insert(key, record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.rows.write().remove(key);
        Ok(())
    }

    async fn update(&self, key: &str, patch: R) -> Result<bool> {
        let mut rows = self.rows.write();
        match rows.get_mut(key) {
            Some(slot) => {
                *slot = patch;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn bulk_put(&self, records: Vec<R>) -> Result<()> {
        let mut rows = self.rows.write();
        for record in records {
            let key = key_of(&record)?;
            rows.insert(key, record);
        }
        Ok(())
    }

    // All-or-nothing within this table: keys are validated against the
    // stored rows and against the batch itself before anything lands.
    async fn bulk_add(&self, records: Vec<R>) -> Result<()> {
        let mut rows = self.rows.write();
        let mut staged: BTreeMap<String, R> = BTreeMap::new();
        for record in records {
            let key = key_of(&record)?;
            if rows.contains_key(&key) || staged.insert(key.clone(), record).is_some() {
                return Err(TableError::DuplicateKey(key).into());
            }
        }
        rows.extend(staged);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<R>> {
        Ok(self.rows.read().values().cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        self.rows.write().clear();
        Ok(())
    }
}
