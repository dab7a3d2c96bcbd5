use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::storage::{Engine, Table};
use crate::util::{ConfigError, Result, TableError};

/// One named shard and the table handles opened on it.
///
/// Shards are created by [`ShardSet::open`] and never exist on their own;
/// the handles inside are shared with every clone of the set.
#[derive(Debug)]
pub struct Shard<T> {
    index: usize,
    name: String,
    tables: BTreeMap<String, Arc<T>>,
}

impl<T: Table> Shard<T> {
    fn open<E>(
        engine: &E,
        index: usize,
        name: String,
        schema: &BTreeMap<String, String>,
    ) -> Result<Self>
    where
        E: Engine<Table = T>,
    {
        let mut tables = BTreeMap::new();
        for (table_name, spec) in schema {
            let table = engine.create_table(&name, table_name, spec)?;
            tables.insert(table_name.clone(), Arc::new(table));
        }
        Ok(Self {
            index,
            name,
            tables,
        })
    }

    /// Position of this shard in its set, `0..shard_count`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Full storage name, `{base_name}{index}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for the named table on this shard.
    pub fn table(&self, name: &str) -> Result<Arc<T>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| TableError::NoSuchTable(name.to_owned()).into())
    }

    /// Every table handle on this shard, in table-name order.
    pub fn tables(&self) -> impl Iterator<Item = &Arc<T>> {
        self.tables.values()
    }
}

/// The fixed, ordered set of shards a service routes over.
#[derive(Debug)]
pub struct ShardSet<T> {
    shards: Vec<Arc<Shard<T>>>,
}

impl<T: Table> ShardSet<T> {
    /// Opens shard `i` as `{base_name}{i}` for every `i` in
    /// `0..shard_count`, creating each schema table on each shard.
    ///
    /// The count is checked before the engine is touched, so a bad config
    /// creates nothing. Names depend only on the config, which is what lets
    /// a reopened set reach the storage a previous run created.
    pub fn open<E>(engine: &E, config: &Config) -> Result<Self>
    where
        E: Engine<Table = T>,
    {
        if config.shard_count == 0 {
            return Err(ConfigError::ShardCount.into());
        }
        let base = config.effective_base_name();
        let mut shards = Vec::with_capacity(config.shard_count);
        for index in 0..config.shard_count {
            let name = format!("{}{}", base, index);
            shards.push(Arc::new(Shard::open(engine, index, name, &config.schema)?));
        }
        tracing::debug!(
            shard_count = shards.len(),
            base_name = base,
            "opened shard set"
        );
        Ok(Self { shards })
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// The shard at `index`.
    ///
    /// Indexes are expected to come from the router, which only produces
    /// values below the set's length.
    pub fn shard(&self, index: usize) -> &Arc<Shard<T>> {
        &self.shards[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Shard<T>>> {
        self.shards.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::storage::{InMemEngine, InMemTable};
    use crate::util::test::TestItem;
    use crate::util::Error;

    fn tester_config(shard_count: usize) -> Config {
        Config::builder()
            .shard_count(shard_count)
            .base_name("tester")
            .table("items", "id")
            .build()
    }

    #[test]
    fn test_names_follow_base_and_index() {
        let engine: InMemEngine<TestItem> = InMemEngine::new();
        let set = ShardSet::open(&engine, &tester_config(6)).unwrap();
        assert_eq!(set.len(), 6);
        for (i, shard) in set.iter().enumerate() {
            assert_eq!(shard.index(), i);
            assert_eq!(shard.name(), format!("tester{}", i));
        }
        assert_eq!(set.shard(5).name(), "tester5");
    }

    #[test]
    fn test_empty_base_name_uses_default() {
        let engine: InMemEngine<TestItem> = InMemEngine::new();
        let config = Config {
            shard_count: 30,
            ..Config::default()
        };
        let set = ShardSet::open(&engine, &config).unwrap();
        assert_eq!(set.shard(0).name(), "keyshard0");
        assert_eq!(set.shard(29).name(), "keyshard29");
    }

    #[test]
    fn test_zero_count_is_rejected_before_creation() {
        struct CountingEngine(AtomicUsize);

        impl Engine for CountingEngine {
            type Table = InMemTable<TestItem>;

            fn create_table(&self, shard: &str, table: &str, spec: &str) -> Result<Self::Table> {
                self.0.fetch_add(1, Ordering::SeqCst);
                InMemEngine::new().create_table(shard, table, spec)
            }
        }

        let engine = CountingEngine(AtomicUsize::new(0));
        let err = ShardSet::open(&engine, &tester_config(0)).unwrap_err();
        assert_eq!(err, Error::Config(ConfigError::ShardCount));
        assert_eq!(err.to_string(), "Shard count must be greater than 0.");
        assert_eq!(engine.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_schema_opens_tableless_shards() {
        let engine: InMemEngine<TestItem> = InMemEngine::new();
        let config = Config::builder().shard_count(3).base_name("bare").build();
        let set = ShardSet::open(&engine, &config).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.shard(0).tables().count(), 0);
        let err = set.shard(0).table("items").unwrap_err();
        assert_eq!(
            err,
            Error::Table(TableError::NoSuchTable("items".to_owned()))
        );
    }

    #[test]
    fn test_schema_spec_reaches_engine_verbatim() {
        let engine: InMemEngine<TestItem> = InMemEngine::new();
        let config = Config::builder()
            .shard_count(2)
            .base_name("tester")
            .table("items", "id, name, *tags")
            .table("logs", "++seq")
            .build();
        let set = ShardSet::open(&engine, &config).unwrap();
        let items = set.shard(1).table("items").unwrap();
        assert_eq!(items.spec(), "id, name, *tags");
        assert_eq!(items.shard(), "tester1");
        assert_eq!(set.shard(0).table("logs").unwrap().spec(), "++seq");
    }
}
