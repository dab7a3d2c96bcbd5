use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure surface of the routing layer.
///
/// Construction failures are synchronous; every other error is delivered
/// through the failing operation's future. `Storage` failures originate in
/// the per-shard engine and pass through the routing layer unchanged.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Config(ConfigError),
    #[error("route error: {0}")]
    Route(RouteError),
    #[error("table error: {0}")]
    Table(TableError),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Shard count must be greater than 0.")]
    ShardCount,
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Error {
        Error::Config(e)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    /// A routing decision was required but the record carries no key.
    #[error("record key is required, none was set")]
    MissingKey,
    /// Keys must consist of base-36 digits (ASCII alphanumerics).
    #[error("key {0:?} is not a base-36 string")]
    InvalidKey(String),
    /// A prepared batch mixed records owned by different shards.
    #[error("batch prepared for shard {expected} contains a record routed to shard {found}")]
    CrossShard { expected: usize, found: usize },
}

impl From<RouteError> for Error {
    fn from(e: RouteError) -> Error {
        Error::Route(e)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate key {0:?}")]
    DuplicateKey(String),
    #[error("key {0:?} not found")]
    NotFound(String),
    #[error("no table named {0:?}")]
    NoSuchTable(String),
}

impl From<TableError> for Error {
    fn from(e: TableError) -> Error {
        Error::Table(e)
    }
}
