use std::collections::BTreeMap;

/// Shard name prefix used when the caller supplies an empty one.
pub const DEFAULT_BASE_NAME: &str = "keyshard";

/// Construction parameters for a [`ShardingService`](crate::ShardingService).
///
/// `schema` maps each table name to an opaque index specification string
/// handed verbatim to the storage engine on every shard; the routing layer
/// never interprets it. Shard `i` is named `{base_name}{i}`, and that
/// naming must stay stable across restarts for engines that expect to
/// reattach to previously created shard storage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of shards; must be at least 1.
    pub shard_count: usize,
    /// Prefix for shard names; empty selects [`DEFAULT_BASE_NAME`].
    pub base_name: String,
    /// Table name to index-spec string, applied identically to every shard.
    pub schema: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: 1,
            base_name: String::new(),
            schema: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub(crate) fn effective_base_name(&self) -> &str {
        if self.base_name.is_empty() {
            DEFAULT_BASE_NAME
        } else {
            &self.base_name
        }
    }
}

/// Builder for [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config.shard_count = count;
        self
    }

    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.config.base_name = name.into();
        self
    }

    /// Declares a table and the opaque spec its engine-side creation
    /// receives. Repeated names overwrite the previous spec.
    pub fn table(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.config.schema.insert(name.into(), spec.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
